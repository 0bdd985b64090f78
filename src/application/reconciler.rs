use crate::common::DomainEvent;
use crate::domains::agent::{AgentEvent, AgentStore};
use crate::domains::logger::DynLogger;
use std::sync::Arc;

/// Applies decoded server events to the agent store.
///
/// Events for ids the store has never seen are dropped silently: during the
/// population bootstrap a `new_path` can legitimately overtake its
/// `add_agent`.
pub struct TransportReconciler {
    logger: DynLogger,
}

impl TransportReconciler {
    pub fn new(logger: DynLogger) -> Self {
        Self { logger }
    }

    /// Apply one event. Returns true when the store changed; otherwise `store`
    /// still points at the very same snapshot it did before the call.
    pub fn apply(&self, store: &mut Arc<AgentStore>, event: AgentEvent) -> bool {
        if !matches!(event, AgentEvent::AgentAdded(_)) {
            if let Some(agent_id) = event.aggregate_id() {
                if !store.contains(agent_id) {
                    tracing::debug!(
                        "Ignoring {} for unknown agent {}",
                        event.event_type(),
                        agent_id
                    );
                    return false;
                }
            }
        }

        match event {
            AgentEvent::AgentAdded(descriptor) => {
                if store.contains(&descriptor.id) {
                    self.logger
                        .warn(&format!("Agent {} added twice; replacing it", descriptor.id));
                }
                Arc::make_mut(store).insert(descriptor.into_agent());
                true
            }
            AgentEvent::PopulationComplete { count } => {
                self.logger
                    .info(&format!("Initial population complete: {} agents", count));
                false
            }
            AgentEvent::PathAssigned {
                agent_id,
                goal,
                path,
                is_fleeing,
            } => {
                Arc::make_mut(store).update(&agent_id, |agent| {
                    agent.assign_path(Some(goal), path);
                    if let Some(is_fleeing) = is_fleeing {
                        agent.is_fleeing = is_fleeing;
                    }
                })
            }
            AgentEvent::FleeStatusChanged {
                agent_id,
                is_fleeing,
            } => {
                Arc::make_mut(store).update(&agent_id, |agent| agent.is_fleeing = is_fleeing)
            }
            AgentEvent::Keepalive => false,
            AgentEvent::Unrecognized { message_type } => {
                self.logger
                    .warn(&format!("Unknown message type: {}", message_type));
                false
            }
        }
    }
}
