use crate::domains::agent::AgentStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A complete, immutable view of the agent store as published after a frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub sequence: u64,
    pub agents: Arc<AgentStore>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(sequence: u64, agents: Arc<AgentStore>) -> Self {
        Self {
            sequence,
            agents,
            created_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(0, Arc::new(AgentStore::new()))
    }
}
