use crate::domains::logger::{DomainLogger, FileLogger};
use log::LevelFilter;
use std::str::FromStr;
use std::sync::Arc;

/// Start the file sink at `path`. `level` is a `log` level name; anything
/// unparsable falls back to `info`.
pub fn init_file_logger(path: &str, level: &str) -> Result<Arc<dyn DomainLogger>, String> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let logger = FileLogger::init(path, level)
        .map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    tracing::debug!("Domain log file at {}", logger.path());
    Ok(Arc::new(logger))
}
