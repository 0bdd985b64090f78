use marl_viewer::adapters::inbound::{ConnectionStatus, WebSocketTransport};
use marl_viewer::adapters::outbound::{init_buffered_logger, init_combined_logger, ChannelPathRequester};
use marl_viewer::domains::agent::AgentListProjection;
use marl_viewer::{ApplicationResult, Config, DynLogger, Session, SystemClock};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApplicationResult<()> {
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    // The file sink claims the `log` facade, so it has to start before tracing
    // tries to bridge `log` records itself.
    let sink = init_combined_logger(config.logging.file.as_deref(), &config.logging.file_level);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let logger: DynLogger = init_buffered_logger(sink, config.logging.buffer_capacity);

    info!("Starting MARL viewer");
    info!("Server: {}", config.connection.url);

    let (transport, channels) = WebSocketTransport::new(config.connection.clone(), logger.clone());
    let requester = Arc::new(ChannelPathRequester::new(
        channels.outbound_tx,
        channels.status_rx.clone(),
    ));

    let session = Session::new(
        &config,
        channels.inbound_rx,
        requester,
        logger.clone(),
        Arc::new(SystemClock),
    );
    let center = session.map_center();
    info!("Map center {:.4}, {:.4}", center.lat, center.lng);

    let handle = session.start();
    let transport_task = tokio::spawn(transport.run(handle.shutdown_signal()));
    let reporter_task = tokio::spawn(report(
        handle.snapshots(),
        channels.status_rx,
        handle.shutdown_signal(),
        config.logging.report_interval(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down MARL viewer");

    let session = handle.stop().await?;
    let _ = transport_task.await;
    let _ = reporter_task.await;
    info!("Session {} closed with {} agents", session.id(), session.store().len());

    Ok(())
}

/// Periodic console view of the latest snapshot: connection status plus the
/// sidebar listing.
async fn report(
    snapshots: watch::Receiver<marl_viewer::Snapshot>,
    status: watch::Receiver<ConnectionStatus>,
    mut shutdown: watch::Receiver<bool>,
    every: std::time::Duration,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = snapshots.borrow().clone();
                let listing = AgentListProjection::from_store(&snapshot.agents);
                info!("Status: {} (snapshot #{})\n{}", *status.borrow(), snapshot.sequence, listing.summary());
            }
            _ = shutdown.changed() => break,
        }
    }
}
