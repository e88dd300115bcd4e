//! Validated sensor configuration and accessory metadata.
//!
//! Values of these types only exist after validation (see
//! [`crate::config`]), so the rest of the workspace never re-checks ports,
//! addresses or timeouts.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::config::{RawRepeater, RawSensorConfig, RawText};
use crate::error::ConfigValidationError;

/// Quiet period after the last trigger before motion resets.
pub const DEFAULT_MOTION_TIMEOUT_SECS: u64 = 11;

/// Address the trigger listener binds when none is configured.
pub const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Manufacturer string published for every accessory.
pub const MANUFACTURER: &str = "http-motion-sensor";

/// Model string published when the configuration has none.
pub const DEFAULT_MODEL: &str = "HTTP Motion Sensor";

/// Serial number published when the configuration has none.
pub const DEFAULT_SERIAL: &str = "Default-Serial";

/// Whether a trigger that arrives while motion is already active pushes
/// `true` to the subscriber again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetriggerPolicy {
    /// Every trigger notifies `true`, even when already active.
    #[default]
    Always,
    /// Only the idle → active transition notifies; retriggers re-arm the
    /// timer silently.
    OnChange,
}

impl RetriggerPolicy {
    /// Keyword used in the configuration file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::OnChange => "on_change",
        }
    }
}

impl FromStr for RetriggerPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "always" => Ok(Self::Always),
            "on_change" => Ok(Self::OnChange),
            _ => Err(()),
        }
    }
}

/// A downstream endpoint notified on every trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeaterTarget {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) path: String,
    pub(crate) auth: Option<String>,
}

impl RepeaterTarget {
    /// Host name or bare IP address (IPv6 without brackets).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request path, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value for the `Authorization` header, if any.
    #[must_use]
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// The URL requested on every trigger: `http://{host}:{port}{path}`.
    #[must_use]
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepeaterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            write!(f, "http://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            write!(f, "http://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

/// Validated configuration of one motion sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub(crate) name: String,
    pub(crate) port: u16,
    pub(crate) bind_ip: IpAddr,
    pub(crate) model: Option<String>,
    pub(crate) serial: Option<String>,
    pub(crate) motion_timeout_secs: u64,
    pub(crate) repeaters: Vec<RepeaterTarget>,
    pub(crate) retrigger_policy: RetriggerPolicy,
}

impl SensorConfig {
    /// Start building a configuration in code; validation runs on
    /// [`SensorConfigBuilder::build`].
    #[must_use]
    pub fn builder(name: impl Into<String>, port: u16) -> SensorConfigBuilder {
        SensorConfigBuilder::new(name, port)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn bind_ip(&self) -> IpAddr {
        self.bind_ip
    }

    /// The `(bind_ip, port)` pair the trigger listener binds.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// How long motion stays active after the last trigger.
    #[must_use]
    pub fn motion_timeout(&self) -> Duration {
        Duration::from_secs(self.motion_timeout_secs)
    }

    #[must_use]
    pub fn repeaters(&self) -> &[RepeaterTarget] {
        &self.repeaters
    }

    #[must_use]
    pub fn retrigger_policy(&self) -> RetriggerPolicy {
        self.retrigger_policy
    }
}

/// Programmatic construction of a [`SensorConfig`].
///
/// Goes through the same validation as file-based configuration.
#[derive(Debug, Clone)]
pub struct SensorConfigBuilder {
    raw: RawSensorConfig,
}

impl SensorConfigBuilder {
    fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            raw: RawSensorConfig {
                name: Some(RawText::Text(name.into())),
                port: Some(i64::from(port).into()),
                ..RawSensorConfig::default()
            },
        }
    }

    #[must_use]
    pub fn bind_ip(mut self, ip: impl Into<String>) -> Self {
        self.raw.bind_ip = Some(RawText::Text(ip.into()));
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.raw.model = Some(RawText::Text(model.into()));
        self
    }

    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.raw.serial = Some(RawText::Text(serial.into()));
        self
    }

    #[must_use]
    pub fn motion_timeout_seconds(mut self, secs: u64) -> Self {
        self.raw.motion_timeout_seconds = Some(i64::try_from(secs).unwrap_or(i64::MAX).into());
        self
    }

    /// Append a structured repeater entry.
    #[must_use]
    pub fn repeater(
        mut self,
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        auth: Option<&str>,
    ) -> Self {
        self.raw.repeater.push(RawRepeater::Entry {
            host: Some(RawText::Text(host.into())),
            port: Some(i64::from(port).into()),
            path: Some(RawText::Text(path.into())),
            auth: auth.map(RawText::from),
        });
        self
    }

    #[must_use]
    pub fn retrigger_policy(mut self, policy: RetriggerPolicy) -> Self {
        self.raw.retrigger_policy = Some(policy.as_str().into());
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Errors
    ///
    /// Returns every invalid field at once.
    pub fn build(self) -> Result<SensorConfig, ConfigValidationError> {
        SensorConfig::try_from(self.raw)
    }
}

/// Display metadata published alongside the motion characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl AccessoryInfo {
    /// Derive the metadata from a sensor configuration, filling defaults.
    #[must_use]
    pub fn for_sensor(config: &SensorConfig) -> Self {
        Self {
            name: config.name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: config.model().unwrap_or(DEFAULT_MODEL).to_string(),
            serial_number: config.serial().unwrap_or(DEFAULT_SERIAL).to_string(),
        }
    }
}
