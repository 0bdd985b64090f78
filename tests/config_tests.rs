use marl_viewer::domains::agent::LatLng;
use marl_viewer::Config;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.connection.url, "wss://urban-marl.mused.com/ws/marl_state");
    assert!(config.connection.focus().is_none());

    let params = config.motion.to_params();
    assert_eq!(params.vehicle_speed, 0.0005);
    assert_eq!(params.pedestrian_speed, 0.0001);
    assert_eq!(params.flee_multiplier, 2.0);
    assert_eq!(params.arrival_threshold, 0.00005);
    assert_eq!(params.path_request_cooldown, Duration::from_millis(3000));
    assert_eq!(config.session.frame_rate_hz, 60);
}

#[tokio::test]
async fn test_from_file_partial_sections() {
    let file = write_toml(
        r#"
[connection]
url = "ws://127.0.0.1:9000/ws"
focus_latitude = 52.52
focus_longitude = 13.405

[motion]
vehicle_speed = 0.001
"#,
    );

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.connection.url, "ws://127.0.0.1:9000/ws");
    assert_eq!(config.connection.focus(), Some(LatLng::new(52.52, 13.405)));
    assert_eq!(config.motion.vehicle_speed, 0.001);
    // Untouched keys keep their defaults.
    assert_eq!(config.motion.pedestrian_speed, 0.0001);
    assert_eq!(config.connection.reconnect_base_ms, 1_000);
}

#[tokio::test]
async fn test_from_file_rejects_bad_toml() {
    let file = write_toml("[connection\nurl = ");
    assert!(Config::from_file(file.path()).await.is_err());
}

#[test]
fn test_load_layers_file_over_defaults() {
    let file = write_toml(
        r#"
[session]
frame_rate_hz = 30

[logging]
report_interval_secs = 10
"#,
    );

    let config = tokio_test::assert_ok!(Config::load(file.path().to_str()));
    assert_eq!(config.session.frame_rate_hz, 30);
    assert_eq!(config.session.frame_period(), Duration::from_secs_f64(1.0 / 30.0));
    assert_eq!(config.logging.report_interval(), Duration::from_secs(10));
    assert_eq!(config.motion.path_request_cooldown_ms, 3_000);
}

#[test]
fn test_load_without_file_uses_defaults() {
    let config = tokio_test::assert_ok!(Config::load(Some("/nonexistent/marl-viewer.toml")));
    assert_eq!(config.connection.outbound_capacity, 256);
    assert!(config.logging.file.is_none());
}

#[test]
fn test_only_one_focus_coordinate_means_no_focus() {
    let mut config = Config::default();
    config.connection.focus_latitude = Some(1.0);
    assert!(config.connection.focus().is_none());

    let payload = config.connection.focus_payload();
    assert_eq!(payload.focus_latitude, Some(1.0));
    assert!(payload.focus_longitude.is_none());
}

#[test]
fn test_load_error_surfaces_as_configuration_error() {
    let file = write_toml("[session]\nframe_rate_hz = \"fast\"\n");
    let err: marl_viewer::ApplicationError = Config::load(file.path().to_str()).unwrap_err().into();
    assert!(matches!(err, marl_viewer::ApplicationError::Configuration(_)));
    assert!(err.to_string().starts_with("Configuration error"));
}
