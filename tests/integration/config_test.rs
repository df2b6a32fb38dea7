//! Integration tests for configuration persistence.

use cycling_sensor_sim::config::{load_config, save_config, AppConfig, ConfigError};
use cycling_sensor_sim::simulator::{ProfileName, SimulatorProfile, UniformRange};
use tempfile::tempdir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = load_config(Some(&path)).unwrap();

    assert_eq!(config, AppConfig::default());
    assert!(!path.exists());
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig {
        profile: ProfileName::Coupled,
        seed: Some(7),
        ..AppConfig::default()
    };
    config.scheduler.max_duration_secs = 90;
    config.device.name = "Bench Rig".to_string();

    let written = save_config(&config, Some(&path)).unwrap();
    assert_eq!(written, path);

    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_custom_profile_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut custom = SimulatorProfile::full();
    custom.power_targets = vec![120, 150, 180, 210, 240];
    let config = AppConfig {
        custom_profile: Some(custom.clone()),
        ..AppConfig::default()
    };
    save_config(&config, Some(&path)).unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded.simulator_profile().unwrap(), custom);
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "profile = [not toml").unwrap();

    assert!(matches!(load_config(Some(&path)), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_unknown_profile_name_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "profile = \"sprint\"\n").unwrap();

    assert!(matches!(load_config(Some(&path)), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_invalid_custom_profile_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut custom = SimulatorProfile::classic();
    custom.battery_level.max = 150;
    let config = AppConfig {
        custom_profile: Some(custom),
        ..AppConfig::default()
    };
    save_config(&config, Some(&path)).unwrap();

    assert!(matches!(
        load_config(Some(&path)),
        Err(ConfigError::InvalidProfile(_))
    ));
}

#[test]
fn test_backwards_power_step_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut custom = SimulatorProfile::classic();
    custom.power_change = UniformRange::new(-3, -1);
    let config = AppConfig {
        custom_profile: Some(custom),
        ..AppConfig::default()
    };
    save_config(&config, Some(&path)).unwrap();

    assert!(matches!(
        load_config(Some(&path)),
        Err(ConfigError::InvalidProfile(_))
    ));
}
