use super::protocol::decode;
use crate::adapters::outbound::OutboundMessage;
use crate::common::TransportResult;
use crate::config::ConnectionConfig;
use crate::domains::agent::AgentEvent;
use crate::domains::logger::DynLogger;
use futures::{SinkExt, StreamExt};
use rand::Rng;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => f.write_str("Connecting..."),
            ConnectionStatus::Connected => f.write_str("Connected"),
            ConnectionStatus::Disconnected => f.write_str("Disconnected. Will attempt to reconnect..."),
            ConnectionStatus::Error(reason) => write!(f, "Connection Error: {}", reason),
        }
    }
}

/// The other ends of the transport's channels, handed to the session and the
/// path requester.
pub struct TransportChannels {
    pub inbound_rx: mpsc::Receiver<AgentEvent>,
    pub outbound_tx: mpsc::Sender<OutboundMessage>,
    pub status_rx: watch::Receiver<ConnectionStatus>,
}

enum SessionEnd {
    /// The server closed the socket; reconnect.
    Closed,
    /// We were asked to stop, or nobody consumes events any more.
    Shutdown,
}

/// WebSocket client for the agent feed. Owns connect, reconnect-with-backoff
/// and frame decoding; everything it learns is pushed through channels.
pub struct WebSocketTransport {
    config: ConnectionConfig,
    logger: DynLogger,
    status_tx: watch::Sender<ConnectionStatus>,
    inbound_tx: mpsc::Sender<AgentEvent>,
    outbound_rx: mpsc::Receiver<OutboundMessage>,
}

impl WebSocketTransport {
    pub fn new(config: ConnectionConfig, logger: DynLogger) -> (Self, TransportChannels) {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity.max(1));
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);

        let transport = Self {
            config,
            logger,
            status_tx,
            inbound_tx,
            outbound_rx,
        };
        let channels = TransportChannels {
            inbound_rx,
            outbound_tx,
            status_rx,
        };
        (transport, channels)
    }

    /// Connect and keep reconnecting until `shutdown` flips to true or its
    /// sender goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut failures: u32 = 0;

        while !*shutdown.borrow() {
            self.set_status(ConnectionStatus::Connecting);
            self.logger
                .info(&format!("Attempting WebSocket connection to {}", self.config.url));

            match self.connection(&mut shutdown).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Closed) => {
                    failures = 0;
                    self.set_status(ConnectionStatus::Disconnected);
                    self.logger.warn("WebSocket disconnected");
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    self.set_status(ConnectionStatus::Error(e.to_string()));
                    self.logger.error(&format!("WebSocket error: {}", e));
                }
            }

            let delay = self.backoff(failures);
            tracing::debug!("Reconnecting in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.set_status(ConnectionStatus::Disconnected);
        self.logger.info("WebSocket transport stopped");
    }

    async fn connection(&mut self, shutdown: &mut watch::Receiver<bool>) -> TransportResult<SessionEnd> {
        let (stream, _response) = connect_async(self.config.url.as_str()).await?;
        self.set_status(ConnectionStatus::Connected);
        self.logger.info("WebSocket connected");

        let (mut write, mut read) = stream.split();

        let hello = OutboundMessage::RequestInitialAgents(self.config.focus_payload());
        write.send(Message::Text(hello.to_json()?)).await?;

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !self.forward(&text).await {
                            let _ = write.close().await;
                            return Ok(SessionEnd::Shutdown);
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        self.logger.warn(&format!("Ignoring binary frame of {} bytes", bytes.len()));
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Closed),
                    // Ping/pong is answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
                outbound = self.outbound_rx.recv() => match outbound {
                    Some(message) => write.send(Message::Text(message.to_json()?)).await?,
                    None => {
                        let _ = write.close().await;
                        return Ok(SessionEnd::Shutdown);
                    }
                },
                _ = shutdown.changed() => {
                    let _ = write.close().await;
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }

    /// Decode one text frame and hand it to the session. Returns false once the
    /// session side has gone away.
    async fn forward(&self, text: &str) -> bool {
        match decode(text) {
            Ok(event) => self.inbound_tx.send(event).await.is_ok(),
            Err(e) => {
                self.logger
                    .error(&format!("Failed to parse message or handle incoming data: {}", e));
                true
            }
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status_tx.send_replace(status);
    }

    fn backoff(&self, failures: u32) -> Duration {
        reconnect_delay(
            self.config.reconnect_base(),
            self.config.reconnect_max(),
            failures,
        )
    }
}

/// Exponential backoff capped at `max`, plus up to 20% random jitter.
pub fn reconnect_delay(base: Duration, max: Duration, failures: u32) -> Duration {
    let factor = 1u32 << failures.min(6);
    let delay = base.saturating_mul(factor).min(max);
    let jitter_ms = (delay.as_millis() as u64) / 5;
    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=jitter_ms)
    } else {
        0
    };
    delay + Duration::from_millis(jitter)
}
