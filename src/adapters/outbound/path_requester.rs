use super::messages::OutboundMessage;
use crate::adapters::inbound::websocket::ConnectionStatus;
use crate::common::{TransportError, TransportResult};
use crate::domains::agent::AgentId;
use crate::domains::motion::PathRequester;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;

/// Hands `request_new_path` messages to the websocket writer. Refuses while the
/// connection is not up instead of queueing stale requests for later.
pub struct ChannelPathRequester {
    sender: mpsc::Sender<OutboundMessage>,
    status: watch::Receiver<ConnectionStatus>,
}

impl ChannelPathRequester {
    pub fn new(sender: mpsc::Sender<OutboundMessage>, status: watch::Receiver<ConnectionStatus>) -> Self {
        Self { sender, status }
    }
}

impl PathRequester for ChannelPathRequester {
    fn request_new_path(&self, agent_id: &AgentId) -> TransportResult<()> {
        if !self.status.borrow().is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.sender
            .try_send(OutboundMessage::RequestNewPath {
                agent_id: agent_id.clone(),
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => TransportError::ChannelFull,
                TrySendError::Closed(_) => TransportError::ChannelClosed,
            })
    }
}
