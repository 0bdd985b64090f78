use crate::adapters::outbound::FocusPayload;
use crate::domains::agent::LatLng;
use crate::domains::motion::{self, MotionParams};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "MARL_VIEWER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub url: String,
    pub focus_latitude: Option<f64>,
    pub focus_longitude: Option<f64>,
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
    pub inbound_capacity: usize,
    pub outbound_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub pedestrian_speed: f64,
    pub vehicle_speed: f64,
    pub flee_multiplier: f64,
    pub arrival_threshold: f64,
    pub path_request_cooldown_ms: u64,
    pub max_frame_delta_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub frame_rate_hz: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Domain log file; console only when unset.
    pub file: Option<String>,
    /// `log` level name for the file sink.
    pub file_level: String,
    pub buffer_capacity: usize,
    pub report_interval_secs: u64,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then `MARL_VIEWER__SECTION__KEY`
    /// environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::new(path, config::FileFormat::Toml).required(false),
            );
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

impl ConnectionConfig {
    /// Focus point, only when both coordinates are configured.
    pub fn focus(&self) -> Option<LatLng> {
        match (self.focus_latitude, self.focus_longitude) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        }
    }

    pub fn focus_payload(&self) -> FocusPayload {
        FocusPayload {
            focus_latitude: self.focus_latitude,
            focus_longitude: self.focus_longitude,
        }
    }

    pub fn reconnect_base(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}

impl MotionConfig {
    pub fn to_params(&self) -> MotionParams {
        MotionParams {
            pedestrian_speed: self.pedestrian_speed,
            vehicle_speed: self.vehicle_speed,
            flee_multiplier: self.flee_multiplier,
            arrival_threshold: self.arrival_threshold,
            path_request_cooldown: Duration::from_millis(self.path_request_cooldown_ms),
            max_frame_delta: Duration::from_millis(self.max_frame_delta_ms),
        }
    }
}

impl SessionConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate_hz.max(1)))
    }
}

impl LoggingConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "wss://urban-marl.mused.com/ws/marl_state".to_string(),
            focus_latitude: None,
            focus_longitude: None,
            reconnect_base_ms: 1_000,
            reconnect_max_ms: 30_000,
            inbound_capacity: 1_024,
            outbound_capacity: 256,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pedestrian_speed: motion::PEDESTRIAN_SPEED_DEG_PER_SEC,
            vehicle_speed: motion::VEHICLE_SPEED_DEG_PER_SEC,
            flee_multiplier: motion::FLEEING_SPEED_MULTIPLIER,
            arrival_threshold: motion::ARRIVAL_THRESHOLD_DEG,
            path_request_cooldown_ms: motion::PATH_REQUEST_COOLDOWN.as_millis() as u64,
            max_frame_delta_ms: motion::MAX_FRAME_DELTA.as_millis() as u64,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { frame_rate_hz: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            file_level: "info".to_string(),
            buffer_capacity: 1_024,
            report_interval_secs: 5,
        }
    }
}
