//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory, or from an
//! explicit path. A missing file yields the defaults.

use crate::simulator::profile::{ProfileError, ProfileName, SimulatorProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Built-in profile to simulate
    pub profile: ProfileName,
    /// Seed for reproducible telemetry; entropy when absent
    pub seed: Option<u64>,
    /// Timer settings
    pub scheduler: SchedulerSettings,
    /// Identity and GATT metadata of the simulated device
    pub device: DeviceSettings,
    /// Fully custom profile, replacing `profile` when present
    pub custom_profile: Option<SimulatorProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile: ProfileName::default(),
            seed: None,
            scheduler: SchedulerSettings::default(),
            device: DeviceSettings::default(),
            custom_profile: None,
        }
    }
}

impl AppConfig {
    /// The profile to simulate, validated.
    pub fn simulator_profile(&self) -> Result<SimulatorProfile, ConfigError> {
        let profile = self
            .custom_profile
            .clone()
            .unwrap_or_else(|| self.profile.profile());
        profile.validate()?;
        Ok(profile)
    }
}

/// Notification timer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Period of the power and heart-rate tick in milliseconds
    pub vitals_interval_ms: u64,
    /// Period of the cadence notification attempt in milliseconds
    pub cadence_interval_ms: u64,
    /// Total run time in seconds
    pub max_duration_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            vitals_interval_ms: 500,
            cadence_interval_ms: 300,
            max_duration_secs: 65 * 60,
        }
    }
}

impl SchedulerSettings {
    pub fn vitals_interval(&self) -> Duration {
        Duration::from_millis(self.vitals_interval_ms.max(1))
    }

    pub fn cadence_interval(&self) -> Duration {
        Duration::from_millis(self.cadence_interval_ms.max(1))
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

/// Identity and static GATT values of the simulated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Advertised and GAP device name
    pub name: String,
    /// Static random address
    pub address: String,
    /// Advertising interval lower bound in milliseconds
    pub advertising_interval_min_ms: u32,
    /// Advertising interval upper bound in milliseconds
    pub advertising_interval_max_ms: u32,
    /// GAP appearance value
    pub appearance: u16,
    pub manufacturer: String,
    pub model_number: String,
    pub serial_number: String,
    pub firmware_revision: String,
    pub hardware_revision: String,
    pub software_revision: String,
    /// Heart Rate body sensor location (2 = wrist)
    pub body_sensor_location: u8,
    /// Cycling Power sensor location (0 = other)
    pub power_sensor_location: u8,
    /// CSC sensor location (5 = left crank)
    pub cadence_sensor_location: u8,
    /// Simulated subscribed centrals on the loopback peripheral
    pub subscribers: usize,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            name: "CyclingSensors".to_string(),
            address: "F0:F1:F2:F3:F4:F6".to_string(),
            advertising_interval_min_ms: 1000,
            advertising_interval_max_ms: 2000,
            appearance: 0x0340,
            manufacturer: "Cycling Sensor Sim".to_string(),
            model_number: "22".to_string(),
            serial_number: "214301961".to_string(),
            firmware_revision: "0.106".to_string(),
            hardware_revision: "1.18".to_string(),
            software_revision: env!("CARGO_PKG_VERSION").to_string(),
            body_sensor_location: 0x02,
            power_sensor_location: 0x00,
            cadence_sensor_location: 0x05,
            subscribers: 1,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "cyclingsensorsim", "CyclingSensorSim")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.simulator_profile()?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

/// Save configuration to `path`, or to the default location.
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(path)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}
