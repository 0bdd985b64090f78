use super::aggregate::{Agent, AgentId, AgentKind, LatLng, Waypoint};
use crate::common::DomainEvent;
use serde::{Deserialize, Serialize};

/// Full agent descriptor carried by `add_agent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub position: LatLng,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    #[serde(default)]
    pub is_fleeing: Option<bool>,
    #[serde(default)]
    pub path_coords: Option<Vec<Waypoint>>,
}

/// Inbound server events, already decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    AgentAdded(AgentDescriptor),
    PopulationComplete {
        count: u64,
    },
    PathAssigned {
        agent_id: AgentId,
        goal: LatLng,
        path: Vec<Waypoint>,
        is_fleeing: Option<bool>,
    },
    FleeStatusChanged {
        agent_id: AgentId,
        is_fleeing: bool,
    },
    Keepalive,
    Unrecognized {
        message_type: String,
    },
}

impl DomainEvent for AgentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::AgentAdded(_) => "add_agent",
            AgentEvent::PopulationComplete { .. } => "initial_population_complete",
            AgentEvent::PathAssigned { .. } => "new_path",
            AgentEvent::FleeStatusChanged { .. } => "update_flee_status",
            AgentEvent::Keepalive => "ping",
            AgentEvent::Unrecognized { .. } => "unrecognized",
        }
    }

    fn aggregate_id(&self) -> Option<&AgentId> {
        match self {
            AgentEvent::AgentAdded(descriptor) => Some(&descriptor.id),
            AgentEvent::PathAssigned { agent_id, .. } => Some(agent_id),
            AgentEvent::FleeStatusChanged { agent_id, .. } => Some(agent_id),
            AgentEvent::PopulationComplete { .. }
            | AgentEvent::Keepalive
            | AgentEvent::Unrecognized { .. } => None,
        }
    }
}

impl AgentDescriptor {
    /// Fresh agent state: cursor at the first waypoint when a path came
    /// along, never having requested a path.
    pub fn into_agent(self) -> Agent {
        let agent = Agent::new(self.id, self.position, self.kind)
            .fleeing(self.is_fleeing.unwrap_or(false));
        match self.path_coords {
            Some(path) => agent.with_path(path),
            None => agent,
        }
    }
}
