use super::reconciler::TransportReconciler;
use crate::common::{ApplicationError, ApplicationResult, DynClock, Snapshot};
use crate::config::Config;
use crate::domains::agent::{AgentEvent, AgentStore, LatLng, MapCenter};
use crate::domains::logger::DynLogger;
use crate::domains::motion::{DynPathRequester, MotionEngine};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// What one frame did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub events_applied: usize,
    pub moved: bool,
    pub renewals_sent: usize,
    pub renewals_failed: usize,
    pub published: bool,
}

/// Explicit session context: the agent store, the last frame time and the
/// collaborators that read or write them. Nothing here lives in globals.
pub struct Session {
    id: Uuid,
    engine: MotionEngine,
    reconciler: TransportReconciler,
    requester: DynPathRequester,
    logger: DynLogger,
    clock: DynClock,
    inbound_rx: mpsc::Receiver<AgentEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
    store: Arc<AgentStore>,
    sequence: u64,
    last_frame: Option<Instant>,
    map_center: MapCenter,
    frame_period: Duration,
}

impl Session {
    pub fn new(
        config: &Config,
        inbound_rx: mpsc::Receiver<AgentEvent>,
        requester: DynPathRequester,
        logger: DynLogger,
        clock: DynClock,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::empty());
        Self {
            id: Uuid::new_v4(),
            engine: MotionEngine::new(config.motion.to_params()),
            reconciler: TransportReconciler::new(logger.clone()),
            requester,
            logger,
            clock,
            inbound_rx,
            snapshot_tx,
            store: Arc::new(AgentStore::new()),
            sequence: 0,
            last_frame: None,
            map_center: MapCenter::new(config.connection.focus()),
            frame_period: config.session.frame_period(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &Arc<AgentStore> {
        &self.store
    }

    pub fn map_center(&self) -> LatLng {
        self.map_center.center()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run one frame: apply every event queued since the previous frame, step
    /// the motion engine by the measured elapsed time, send path renewals and
    /// publish a single snapshot if anything changed.
    pub fn frame(&mut self) -> FrameReport {
        let now = self.clock.now();
        let mut report = FrameReport::default();
        let mut changed = false;

        while let Ok(event) = self.inbound_rx.try_recv() {
            report.events_applied += 1;
            changed |= self.apply_event(event);
        }

        let dt = match self.last_frame.replace(now) {
            Some(previous) => self
                .engine
                .params()
                .clamp_delta(now.saturating_duration_since(previous)),
            None => 0.0,
        };

        let outcome = self.engine.tick(&self.store, dt, now);
        for id in &outcome.completed {
            self.logger.info(&format!("Agent {} reached end of path.", id));
        }
        if let Some(next) = outcome.store {
            self.store = Arc::new(next);
            report.moved = true;
            changed = true;
        }

        for agent_id in outcome.renewals {
            let result = self.requester.request_new_path(&agent_id);
            // Stamp the attempt when it happened, not when the tick started.
            let sent_at = self.clock.now();
            match result {
                Ok(()) => {
                    report.renewals_sent += 1;
                    self.logger
                        .info(&format!("Requesting new path for agent {}", agent_id));
                }
                Err(e) => {
                    report.renewals_failed += 1;
                    self.logger.warn(&format!(
                        "Path request for agent {} not sent: {}",
                        agent_id, e
                    ));
                }
            }
            changed |= Arc::make_mut(&mut self.store)
                .update(&agent_id, |agent| agent.last_path_request = Some(sent_at));
        }

        if changed {
            self.publish();
            report.published = true;
        }
        report
    }

    fn apply_event(&mut self, event: AgentEvent) -> bool {
        if let AgentEvent::AgentAdded(descriptor) = &event {
            if self.map_center.observe_agent(descriptor.position) {
                self.logger.info(&format!(
                    "Map centered on first agent {} at {:.4}, {:.4}",
                    descriptor.id, descriptor.position.lat, descriptor.position.lng
                ));
            }
        }
        self.reconciler.apply(&mut self.store, event)
    }

    fn publish(&mut self) {
        self.sequence += 1;
        self.snapshot_tx
            .send_replace(Snapshot::new(self.sequence, Arc::clone(&self.store)));
    }

    /// Spawn the frame loop on the current tokio runtime.
    pub fn start(self) -> SessionHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let id = self.id;
        let snapshots = self.subscribe();
        let task = tokio::spawn(self.run(shutdown_rx));
        SessionHandle {
            id,
            snapshots,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        let mut interval = tokio::time::interval(self.frame_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.logger.info(&format!("Session {} started", self.id));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.frame();
                }
                _ = shutdown.changed() => break,
            }
        }

        self.logger.info(&format!(
            "Session {} stopped with {} agents",
            self.id,
            self.store.len()
        ));
        self
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    id: Uuid,
    snapshots: watch::Receiver<Snapshot>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Receiver that flips to true when the session stops; hand it to the
    /// transport so both wind down together.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Stop the frame loop and get the session back.
    pub async fn stop(self) -> ApplicationResult<Session> {
        self.shutdown.send_replace(true);
        self.task
            .await
            .map_err(|e| ApplicationError::Session(format!("frame loop failed: {}", e)))
    }
}
