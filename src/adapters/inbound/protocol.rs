//! Inbound wire codec: `{ "type": ..., "payload": ... }` JSON frames into
//! [`AgentEvent`] values.
//!
//! An unknown `type` is not an error; it decodes to
//! [`AgentEvent::Unrecognized`] so the reconciler can log it. Only frames that
//! are not JSON, or whose payload does not fit the declared type, fail.

use crate::common::{ProtocolError, ProtocolResult};
use crate::domains::agent::{AgentDescriptor, AgentEvent, AgentId, LatLng, Waypoint};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub const ADD_AGENT: &str = "add_agent";
pub const POPULATION_COMPLETE: &str = "initial_population_complete";
pub const NEW_PATH: &str = "new_path";
pub const UPDATE_FLEE_STATUS: &str = "update_flee_status";
pub const PING: &str = "ping";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct PopulationCompletePayload {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Deserialize)]
struct NewPathPayload {
    agent_id: AgentId,
    goal: LatLng,
    #[serde(default)]
    path_coords: Option<Vec<Waypoint>>,
    #[serde(default)]
    is_fleeing: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct FleeStatusPayload {
    agent_id: AgentId,
    is_fleeing: bool,
}

pub fn decode(text: &str) -> ProtocolResult<AgentEvent> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let Envelope {
        message_type,
        payload,
    } = envelope;

    let event = match message_type.as_str() {
        ADD_AGENT => AgentEvent::AgentAdded(parse_payload::<AgentDescriptor>(&message_type, payload)?),
        POPULATION_COMPLETE => {
            let p: PopulationCompletePayload = parse_payload(&message_type, payload)?;
            AgentEvent::PopulationComplete { count: p.count }
        }
        NEW_PATH => {
            let p: NewPathPayload = parse_payload(&message_type, payload)?;
            AgentEvent::PathAssigned {
                agent_id: p.agent_id,
                goal: p.goal,
                path: p.path_coords.unwrap_or_default(),
                is_fleeing: p.is_fleeing,
            }
        }
        UPDATE_FLEE_STATUS => {
            let p: FleeStatusPayload = parse_payload(&message_type, payload)?;
            AgentEvent::FleeStatusChanged {
                agent_id: p.agent_id,
                is_fleeing: p.is_fleeing,
            }
        }
        PING => AgentEvent::Keepalive,
        other => AgentEvent::Unrecognized {
            message_type: other.to_string(),
        },
    };
    Ok(event)
}

fn parse_payload<T: DeserializeOwned>(message_type: &str, payload: Value) -> ProtocolResult<T> {
    // A missing payload reads as an empty object so all-default payloads still parse.
    let payload = match payload {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(payload).map_err(|source| ProtocolError::InvalidPayload {
        message_type: message_type.to_string(),
        source,
    })
}
