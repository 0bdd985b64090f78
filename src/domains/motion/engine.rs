use crate::domains::agent::{Agent, AgentId, AgentKind, AgentStore, LatLng};
use std::time::{Duration, Instant};

/// Degrees per second. Roughly 55 km/h at the equator.
pub const VEHICLE_SPEED_DEG_PER_SEC: f64 = 0.0005;
pub const PEDESTRIAN_SPEED_DEG_PER_SEC: f64 = 0.0001;
pub const FLEEING_SPEED_MULTIPLIER: f64 = 2.0;
/// Degrees.
pub const ARRIVAL_THRESHOLD_DEG: f64 = 0.00005;
pub const PATH_REQUEST_COOLDOWN: Duration = Duration::from_millis(3000);
pub const MAX_FRAME_DELTA: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub pedestrian_speed: f64,
    pub vehicle_speed: f64,
    pub flee_multiplier: f64,
    pub arrival_threshold: f64,
    pub path_request_cooldown: Duration,
    pub max_frame_delta: Duration,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            pedestrian_speed: PEDESTRIAN_SPEED_DEG_PER_SEC,
            vehicle_speed: VEHICLE_SPEED_DEG_PER_SEC,
            flee_multiplier: FLEEING_SPEED_MULTIPLIER,
            arrival_threshold: ARRIVAL_THRESHOLD_DEG,
            path_request_cooldown: PATH_REQUEST_COOLDOWN,
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl MotionParams {
    pub fn speed_for(&self, agent: &Agent) -> f64 {
        let base = match agent.kind {
            AgentKind::Pedestrian => self.pedestrian_speed,
            AgentKind::Vehicle => self.vehicle_speed,
        };
        if agent.is_fleeing {
            base * self.flee_multiplier
        } else {
            base
        }
    }

    /// Frame delta in seconds, capped at `max_frame_delta`.
    pub fn clamp_delta(&self, dt: Duration) -> f64 {
        dt.min(self.max_frame_delta).as_secs_f64()
    }
}

/// The one place that decides whether an agent may ask for a new path.
#[derive(Debug, Clone, Copy)]
pub struct RenewalGate {
    cooldown: Duration,
}

impl RenewalGate {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn allows(&self, last_request: Option<Instant>, now: Instant) -> bool {
        match last_request {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.cooldown,
        }
    }
}

/// Result of moving a single agent for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub agent: Agent,
    pub exhausted: bool,
}

#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Replacement store, present only when some agent actually changed.
    pub store: Option<AgentStore>,
    /// Agents that should be sent a `request_new_path`, at most once each.
    pub renewals: Vec<AgentId>,
    /// Agents that walked off the end of their path this frame.
    pub completed: Vec<AgentId>,
}

impl TickOutcome {
    pub fn changed(&self) -> bool {
        self.store.is_some()
    }
}

pub struct MotionEngine {
    params: MotionParams,
    gate: RenewalGate,
}

impl MotionEngine {
    pub fn new(params: MotionParams) -> Self {
        Self {
            gate: RenewalGate::new(params.path_request_cooldown),
            params,
        }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Advance every agent with an active path by `dt` seconds of travel.
    ///
    /// `store` is read as-is; the outcome carries a new store only if at least
    /// one agent moved. A zero (or non-finite) delta does nothing at all.
    pub fn tick(&self, store: &AgentStore, dt: f64, now: Instant) -> TickOutcome {
        if !dt.is_finite() || dt <= 0.0 {
            return TickOutcome::default();
        }
        let dt = dt.min(self.params.max_frame_delta.as_secs_f64());

        let mut moved = Vec::new();
        let mut outcome = TickOutcome::default();

        for agent in store.iter() {
            if let Some(step) = self.step(agent, dt) {
                if step.exhausted {
                    outcome.completed.push(step.agent.id.clone());
                    if self.gate.allows(step.agent.last_path_request, now) {
                        outcome.renewals.push(step.agent.id.clone());
                    }
                }
                moved.push(step.agent);
            } else if self.wants_renewal(agent, now) {
                outcome.renewals.push(agent.id.clone());
            }
        }

        if !moved.is_empty() {
            outcome.store = Some(store.with_replaced(moved));
        }
        outcome
    }

    /// Move one agent toward its current waypoint. `None` when the agent has
    /// no active path.
    pub fn step(&self, agent: &Agent, dt: f64) -> Option<AgentStep> {
        let target = agent.current_target()?;
        let cursor = agent.path_cursor?;
        let mut next = agent.clone();

        let dx = target.lng - agent.position.lng;
        let dy = target.lat - agent.position.lat;
        let distance = (dx * dx + dy * dy).sqrt();
        let move_distance = self.params.speed_for(agent) * dt;

        if distance <= self.params.arrival_threshold || move_distance >= distance {
            next.position = target.position();
            let advanced = cursor + 1;
            let path_len = agent.path.as_ref().map_or(0, Vec::len);
            if advanced >= path_len {
                next.finish_path();
                return Some(AgentStep {
                    agent: next,
                    exhausted: true,
                });
            }
            next.path_cursor = Some(advanced);
            return Some(AgentStep {
                agent: next,
                exhausted: false,
            });
        }

        // distance > threshold >= 0 here, so the division is safe.
        let scale = move_distance / distance;
        next.position = LatLng::new(
            agent.position.lat + dy * scale,
            agent.position.lng + dx * scale,
        );
        Some(AgentStep {
            agent: next,
            exhausted: false,
        })
    }

    /// Idle agents that lost their path and are calm may ask again once the
    /// cooldown has lapsed.
    fn wants_renewal(&self, agent: &Agent, now: Instant) -> bool {
        agent.path.is_none()
            && agent.awaiting_path
            && !agent.is_fleeing
            && self.gate.allows(agent.last_path_request, now)
    }
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(MotionParams::default())
    }
}
