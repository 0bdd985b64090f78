use crate::common::TransportResult;
use crate::domains::agent::AgentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_longitude: Option<f64>,
}

/// Client-to-server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutboundMessage {
    RequestInitialAgents(FocusPayload),
    RequestNewPath { agent_id: AgentId },
}

impl OutboundMessage {
    pub fn to_json(&self) -> TransportResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
