use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Swallows every line. Used where a session or transport is built without
/// anyone watching its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardLogger;

impl DomainLogger for DiscardLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

pub fn init_noop_logger() -> DynLogger {
    Arc::new(DiscardLogger)
}
