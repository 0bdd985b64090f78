use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards domain log lines to `tracing` so they share the subscriber set up
/// by the binary.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "marl_viewer::domain", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "marl_viewer::domain", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "marl_viewer::domain", "{}", msg);
    }
}

pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(TracingBridge {})
}
