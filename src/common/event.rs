use crate::domains::agent::AgentId;

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    /// Agent the event targets, if any.
    fn aggregate_id(&self) -> Option<&AgentId>;
}
