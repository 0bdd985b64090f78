use crate::common::TransportResult;
use crate::domains::agent::AgentId;
use std::sync::Arc;

/// Outbound port for `request_new_path`. Fire-and-forget: implementations must
/// not block the frame loop and the engine never retries a failed call itself.
pub trait PathRequester: Send + Sync {
    fn request_new_path(&self, agent_id: &AgentId) -> TransportResult<()>;
}

pub type DynPathRequester = Arc<dyn PathRequester>;
