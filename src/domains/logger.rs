use chrono::Utc;
use log::{Level, LevelFilter};
use std::sync::Arc;

/// Logging port shared by the reconciler, the frame loop and the transport.
/// Calls never fail from the caller's side.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// File sink on top of `fast_log`. It claims the process-wide `log` facade,
/// so at most one can be initialized.
pub struct FileLogger {
    path: String,
}

impl FileLogger {
    pub fn init(path: &str, level: LevelFilter) -> Result<Self, fast_log::error::LogError> {
        fast_log::init(fast_log::config::Config::new().file(path).level(level))?;
        Ok(Self {
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn write(&self, level: Level, msg: &str) {
        log::log!(target: "marl_viewer", level, "{} {}", Utc::now().to_rfc3339(), msg);
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        self.write(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.write(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.write(Level::Error, msg);
    }
}
