//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `motion-sensord.toml` in the working directory, or the file
//! named by `MOTION_SENSORD_CONFIG`. Every section has a default so the file
//! is optional; without it no sensor is configured. Sensor entries are kept
//! as TOML values here and decoded then validated one by one when the
//! platform starts, so one bad sensor never prevents the others from running.

use serde::Deserialize;

use motion_adapter_repeater_reqwest::RepeaterConfig;
use motion_domain::config::RawSensorConfig;

const DEFAULT_PATH: &str = "motion-sensord.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Multi-sensor platform settings.
    pub platform: PlatformConfig,
    /// Outbound repeater client settings.
    pub repeater: RepeaterConfig,
    /// One entry per motion sensor, decoded by [`Config::sensor_entries`].
    pub sensors: Vec<toml::Value>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Platform configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Name shown in platform log lines.
    pub name: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or
    /// unreadable, or if platform-level settings are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MOTION_SENSORD_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Decode every sensor entry on its own.
    ///
    /// Mistyped fields inside a sensor table are kept for validation; only an
    /// entry that is not a table at all fails here.
    pub fn sensor_entries(
        &self,
    ) -> impl Iterator<Item = Result<RawSensorConfig, SensorEntryError>> + '_ {
        self.sensors.iter().enumerate().map(|(index, value)| {
            value
                .clone()
                .try_into()
                .map_err(|source| SensorEntryError { index, source })
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MOTION_SENSORD_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.name.trim().is_empty() {
            return Err(ConfigError::EmptyPlatformName);
        }
        if self.repeater.timeout_secs == 0 {
            return Err(ConfigError::ZeroRepeaterTimeout);
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "motion_sensord=info,motion_app=info,motion_adapter_http_axum=info,\
                     motion_adapter_repeater_reqwest=info,tower_http=info"
                .to_string(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: "HttpMotionSensorPlatform".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// `platform.name` is blank.
    #[error("invalid configuration: platform.name must not be empty")]
    EmptyPlatformName,
    /// `repeater.timeout_secs` is zero.
    #[error("invalid configuration: repeater.timeout_secs must be positive")]
    ZeroRepeaterTimeout,
}

/// A `[[sensors]]` entry that cannot be read as a sensor table.
#[derive(Debug, thiserror::Error)]
#[error("sensors[{index}] is not a valid sensor entry: {source}")]
pub struct SensorEntryError {
    /// Position of the entry in the file.
    pub index: usize,
    /// Decoding failure.
    pub source: toml::de::Error,
}
