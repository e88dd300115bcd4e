//! Raw sensor configuration and its validation.
//!
//! [`RawSensorConfig`] mirrors what users write in the configuration file:
//! every field optional, numbers accepted as integers or numeric strings,
//! repeaters given either as a structured entry or as a bare URL. Values of
//! the wrong type are kept as [`WrongType`] instead of failing
//! deserialization, so one mistyped sensor never hides its siblings.
//! Converting it into a [`SensorConfig`] checks every field and reports all
//! problems in a single [`ConfigValidationError`].

use std::net::{IpAddr, Ipv6Addr};

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

use crate::error::{ConfigValidationError, FieldError, FieldErrorKind};
use crate::sensor::{
    DEFAULT_BIND_IP, DEFAULT_MOTION_TIMEOUT_SECS, RepeaterTarget, RetriggerPolicy, SensorConfig,
};

/// Lowest port a sensor may listen on (privileged ports are refused).
pub const MIN_SENSOR_PORT: i64 = 1024;

/// Lowest port a repeater may be reached on.
pub const MIN_REPEATER_PORT: i64 = 1;

const MAX_PORT: i64 = 65535;

/// Placeholder for a value whose type the field does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongType;

impl<'de> Deserialize<'de> for WrongType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| Self)
    }
}

/// A string as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Other(WrongType),
}

impl From<String> for RawText {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RawText {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A number as written in the configuration: `8080` or `"8080"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Text(String),
    Other(WrongType),
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A repeater as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawRepeater {
    /// Legacy form: `"http://host[:port]/path"`.
    Url(String),
    /// Structured form.
    Entry {
        host: Option<RawText>,
        port: Option<RawNumber>,
        path: Option<RawText>,
        auth: Option<RawText>,
    },
    /// Neither a string nor a table.
    Other(WrongType),
}

/// The `repeater` list as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawRepeaters {
    List(Vec<RawRepeater>),
    Other(WrongType),
}

impl Default for RawRepeaters {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl RawRepeaters {
    /// Number of entries, `0` when the list itself is mistyped.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Other(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&mut self, entry: RawRepeater) {
        match self {
            Self::List(list) => list.push(entry),
            Self::Other(_) => *self = Self::List(vec![entry]),
        }
    }
}

/// Unvalidated configuration of one sensor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSensorConfig {
    pub name: Option<RawText>,
    pub port: Option<RawNumber>,
    pub bind_ip: Option<RawText>,
    pub model: Option<RawText>,
    pub serial: Option<RawText>,
    pub motion_timeout_seconds: Option<RawNumber>,
    #[serde(default)]
    pub repeater: RawRepeaters,
    pub retrigger_policy: Option<RawText>,
}

impl RawSensorConfig {
    /// Best-effort name for log lines, even when the config is invalid.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(RawText::Text(name)) if !name.trim().is_empty() => name,
            _ => "<unnamed>",
        }
    }
}

impl TryFrom<RawSensorConfig> for SensorConfig {
    type Error = ConfigValidationError;

    fn try_from(raw: RawSensorConfig) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let name = required_text("name", raw.name, &mut errors);
        let port = port_field("port", raw.port.as_ref(), MIN_SENSOR_PORT, &mut errors);

        let bind_ip = match text("bind_ip", raw.bind_ip, &mut errors) {
            Ok(None) => Some(DEFAULT_BIND_IP),
            Ok(Some(text)) => match text.trim().parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    errors.push(FieldError::new("bind_ip", FieldErrorKind::InvalidIp(text)));
                    None
                }
            },
            Err(()) => None,
        };

        let motion_timeout_secs = match raw.motion_timeout_seconds {
            None => Some(DEFAULT_MOTION_TIMEOUT_SECS),
            Some(value) => integer("motion_timeout_seconds", &value, &mut errors).and_then(|n| {
                match u64::try_from(n) {
                    Ok(secs) if secs > 0 => Some(secs),
                    _ => {
                        errors.push(FieldError::new(
                            "motion_timeout_seconds",
                            FieldErrorKind::NotPositive(n),
                        ));
                        None
                    }
                }
            }),
        };

        let model = text("model", raw.model, &mut errors).ok().flatten();
        let serial = text("serial", raw.serial, &mut errors).ok().flatten();

        let retrigger_policy = match text("retrigger_policy", raw.retrigger_policy, &mut errors) {
            Ok(None) => Some(RetriggerPolicy::default()),
            Ok(Some(value)) => match value.trim().parse::<RetriggerPolicy>() {
                Ok(policy) => Some(policy),
                Err(()) => {
                    errors.push(FieldError::new(
                        "retrigger_policy",
                        FieldErrorKind::UnknownValue {
                            value,
                            expected: "\"always\" or \"on_change\"",
                        },
                    ));
                    None
                }
            },
            Err(()) => None,
        };

        let repeaters: Vec<RepeaterTarget> = match raw.repeater {
            RawRepeaters::List(list) => list
                .into_iter()
                .enumerate()
                .filter_map(|(idx, entry)| repeater(idx, entry, &mut errors))
                .collect(),
            RawRepeaters::Other(_) => {
                errors.push(FieldError::new(
                    "repeater",
                    FieldErrorKind::WrongType {
                        expected: "an array",
                    },
                ));
                Vec::new()
            }
        };

        match (name, port, bind_ip, motion_timeout_secs, retrigger_policy) {
            (Some(name), Some(port), Some(bind_ip), Some(motion_timeout_secs), Some(retrigger_policy))
                if errors.is_empty() =>
            {
                Ok(Self {
                    name,
                    port,
                    bind_ip,
                    model: optional_text(model),
                    serial: optional_text(serial),
                    motion_timeout_secs,
                    repeaters,
                    retrigger_policy,
                })
            }
            _ => Err(ConfigValidationError::new(errors)),
        }
    }
}

/// `Ok(None)` when absent, `Err(())` once a type error has been recorded.
fn text(field: &str, value: Option<RawText>, errors: &mut Vec<FieldError>) -> Result<Option<String>, ()> {
    match value {
        None => Ok(None),
        Some(RawText::Text(text)) => Ok(Some(text)),
        Some(RawText::Other(_)) => {
            errors.push(FieldError::new(
                field,
                FieldErrorKind::WrongType {
                    expected: "a string",
                },
            ));
            Err(())
        }
    }
}

fn required_text(field: &str, value: Option<RawText>, errors: &mut Vec<FieldError>) -> Option<String> {
    match text(field, value, errors) {
        Ok(None) => {
            errors.push(FieldError::new(field, FieldErrorKind::Missing));
            None
        }
        Ok(Some(text)) if text.trim().is_empty() => {
            errors.push(FieldError::new(field, FieldErrorKind::Empty));
            None
        }
        Ok(Some(text)) => Some(text),
        Err(()) => None,
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn integer(field: &str, value: &RawNumber, errors: &mut Vec<FieldError>) -> Option<i64> {
    match value {
        RawNumber::Int(n) => Some(*n),
        RawNumber::Text(text) => match text.trim().parse() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(FieldError::new(
                    field,
                    FieldErrorKind::NotAnInteger(text.clone()),
                ));
                None
            }
        },
        RawNumber::Other(_) => {
            errors.push(FieldError::new(
                field,
                FieldErrorKind::WrongType {
                    expected: "an integer",
                },
            ));
            None
        }
    }
}

fn port_field(
    field: &str,
    value: Option<&RawNumber>,
    min: i64,
    errors: &mut Vec<FieldError>,
) -> Option<u16> {
    let Some(value) = value else {
        errors.push(FieldError::new(field, FieldErrorKind::Missing));
        return None;
    };
    let n = integer(field, value, errors)?;
    if !(min..=MAX_PORT).contains(&n) {
        errors.push(FieldError::new(
            field,
            FieldErrorKind::OutOfRange {
                min,
                max: MAX_PORT,
                actual: n,
            },
        ));
        return None;
    }
    u16::try_from(n).ok()
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Bare host form shared by both repeater shapes: IPv6 literals lose their
/// brackets and take their canonical spelling.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let bare = host
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host);
    match bare.parse::<Ipv6Addr>() {
        Ok(addr) => addr.to_string(),
        Err(_) => bare.to_string(),
    }
}

fn repeater(idx: usize, raw: RawRepeater, errors: &mut Vec<FieldError>) -> Option<RepeaterTarget> {
    match raw {
        RawRepeater::Url(text) => repeater_from_url(idx, &text, errors),
        RawRepeater::Entry {
            host,
            port,
            path,
            auth,
        } => {
            let host = required_text(&format!("repeater[{idx}].host"), host, errors);
            let port = port_field(
                &format!("repeater[{idx}].port"),
                port.as_ref(),
                MIN_REPEATER_PORT,
                errors,
            );
            let path = required_text(&format!("repeater[{idx}].path"), path, errors);
            let auth = text(&format!("repeater[{idx}].auth"), auth, errors);
            Some(RepeaterTarget {
                host: normalize_host(&host?),
                port: port?,
                path: normalize_path(path?.trim()),
                auth: optional_text(auth.ok()?),
            })
        }
        RawRepeater::Other(_) => {
            errors.push(FieldError::new(
                format!("repeater[{idx}]"),
                FieldErrorKind::WrongType {
                    expected: "a URL string or a table",
                },
            ));
            None
        }
    }
}

fn repeater_from_url(idx: usize, text: &str, errors: &mut Vec<FieldError>) -> Option<RepeaterTarget> {
    let field = format!("repeater[{idx}]");
    let url = match url::Url::parse(text.trim()) {
        Ok(url) => url,
        Err(err) => {
            errors.push(FieldError::new(
                field,
                FieldErrorKind::InvalidUrl {
                    reason: err.to_string(),
                },
            ));
            return None;
        }
    };
    if url.scheme() != "http" {
        errors.push(FieldError::new(
            field,
            FieldErrorKind::UnsupportedScheme(url.scheme().to_string()),
        ));
        return None;
    }
    let host = match url.host() {
        Some(url::Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(url::Host::Ipv4(addr)) => addr.to_string(),
        Some(url::Host::Ipv6(addr)) => addr.to_string(),
        _ => {
            errors.push(FieldError::new(
                field,
                FieldErrorKind::InvalidUrl {
                    reason: "missing host".to_string(),
                },
            ));
            return None;
        }
    };
    let path = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };
    Some(RepeaterTarget {
        host,
        port: url.port_or_known_default().unwrap_or(80),
        path,
        auth: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(text: &str) -> Result<SensorConfig, ConfigValidationError> {
        let raw: RawSensorConfig = toml::from_str(text).unwrap();
        SensorConfig::try_from(raw)
    }

    #[test]
    fn should_accept_minimal_config() {
        let config = parse("name = 'Porch'\nport = 8080\nmotion_timeout_seconds = 11").unwrap();
        assert_eq!(config.name(), "Porch");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.motion_timeout(), Duration::from_secs(11));
    }

    #[test]
    fn should_accept_full_config() {
        let config = parse(
            r#"
            name = "Hallway"
            port = 10300
            bind_ip = "::1"
            model = "HC-SR501"
            serial = "hall-01"
            motion_timeout_seconds = 30
            retrigger_policy = "on_change"
            repeater = [
                { host = "10.0.0.2", port = 8080, path = "/motion", auth = "Bearer t" },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_ip(), "::1".parse::<IpAddr>().unwrap());
        assert_eq!(config.model(), Some("HC-SR501"));
        assert_eq!(config.serial(), Some("hall-01"));
        assert_eq!(config.motion_timeout(), Duration::from_secs(30));
        assert_eq!(config.retrigger_policy(), RetriggerPolicy::OnChange);
        assert_eq!(config.repeaters().len(), 1);
        assert_eq!(config.repeaters()[0].auth(), Some("Bearer t"));
    }

    #[test]
    fn should_reject_privileged_port_and_name_it() {
        let err = parse("name = 'Porch'\nport = 80").unwrap_err();
        assert!(err.has_field("port"));
        assert_eq!(
            err.errors()[0].kind,
            FieldErrorKind::OutOfRange {
                min: 1024,
                max: 65535,
                actual: 80
            }
        );
    }

    #[test]
    fn should_report_all_invalid_fields_together() {
        let err = parse(
            r#"
            name = ""
            port = 70000
            bind_ip = "not-an-ip"
            motion_timeout_seconds = 0
            repeater = [{ port = 0, path = "/x" }]
            "#,
        )
        .unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("port"));
        assert!(err.has_field("bind_ip"));
        assert!(err.has_field("motion_timeout_seconds"));
        assert!(err.has_field("repeater[0].host"));
        assert!(err.has_field("repeater[0].port"));
        assert_eq!(err.errors().len(), 6);
    }

    #[test]
    fn should_require_name_and_port() {
        let err = parse("").unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("port"));
    }

    #[test]
    fn should_coerce_numeric_strings() {
        let config = parse("name = 'Porch'\nport = '8080'\nmotion_timeout_seconds = '5'").unwrap();
        assert_eq!(config.port(), 8080);
        assert_eq!(config.motion_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn should_reject_non_numeric_port_string() {
        let err = parse("name = 'Porch'\nport = 'eighty'").unwrap_err();
        assert_eq!(
            err.errors()[0].kind,
            FieldErrorKind::NotAnInteger("eighty".to_string())
        );
    }

    #[test]
    fn should_normalize_legacy_url_repeater_like_structured_entry() {
        let legacy = parse(
            "name = 'Porch'\nport = 8080\nrepeater = ['http://10.0.0.3:9000/motion?zone=1']",
        )
        .unwrap();
        let structured = parse(
            "name = 'Porch'\nport = 8080\nrepeater = [{ host = '10.0.0.3', port = 9000, path = '/motion?zone=1' }]",
        )
        .unwrap();
        assert_eq!(legacy.repeaters(), structured.repeaters());
    }

    #[test]
    fn should_default_legacy_url_port_to_80() {
        let config = parse("name = 'Porch'\nport = 8080\nrepeater = ['http://relay.local/hit']").unwrap();
        assert_eq!(config.repeaters()[0].url(), "http://relay.local:80/hit");
    }

    #[test]
    fn should_reject_https_legacy_repeater() {
        let err = parse("name = 'Porch'\nport = 8080\nrepeater = ['https://relay.local/hit']")
            .unwrap_err();
        assert_eq!(
            err.errors()[0],
            FieldError::new(
                "repeater[0]",
                FieldErrorKind::UnsupportedScheme("https".to_string())
            )
        );
    }

    #[test]
    fn should_prefix_repeater_path_with_slash() {
        let config = parse(
            "name = 'Porch'\nport = 8080\nrepeater = [{ host = 'relay', port = 81, path = 'motion' }]",
        )
        .unwrap();
        assert_eq!(config.repeaters()[0].path(), "/motion");
    }

    #[test]
    fn should_treat_blank_optional_strings_as_absent() {
        let config = parse("name = 'Porch'\nport = 8080\nmodel = ''\nserial = '  '").unwrap();
        assert_eq!(config.model(), None);
        assert_eq!(config.serial(), None);
    }

    #[test]
    fn should_report_mistyped_fields_instead_of_failing_to_parse() {
        let err = parse(
            r#"
            name = 42
            port = true
            bind_ip = 127
            motion_timeout_seconds = 1.5
            retrigger_policy = "sometimes"
            repeater = [true, { host = 1, port = 80, path = "/x" }]
            "#,
        )
        .unwrap_err();
        let wrong = |expected| FieldErrorKind::WrongType { expected };
        assert_eq!(
            err.errors(),
            &[
                FieldError::new("name", wrong("a string")),
                FieldError::new("port", wrong("an integer")),
                FieldError::new("bind_ip", wrong("a string")),
                FieldError::new("motion_timeout_seconds", wrong("an integer")),
                FieldError::new(
                    "retrigger_policy",
                    FieldErrorKind::UnknownValue {
                        value: "sometimes".to_string(),
                        expected: "\"always\" or \"on_change\"",
                    },
                ),
                FieldError::new("repeater[0]", wrong("a URL string or a table")),
                FieldError::new("repeater[1].host", wrong("a string")),
            ]
        );
    }

    #[test]
    fn should_report_repeater_that_is_not_a_list() {
        let err = parse("name = 'Porch'\nport = 8080\nrepeater = 'http://relay/hit'").unwrap_err();
        assert_eq!(
            err.errors(),
            &[FieldError::new(
                "repeater",
                FieldErrorKind::WrongType {
                    expected: "an array"
                }
            )]
        );
    }

    #[test]
    fn should_normalize_ipv6_repeater_hosts_in_both_forms() {
        let legacy = parse("name = 'Porch'\nport = 8080\nrepeater = ['http://[::1]:9000/m']").unwrap();
        let structured =
            parse("name = 'Porch'\nport = 8080\nrepeater = [{ host = '::1', port = 9000, path = '/m' }]")
                .unwrap();
        let bracketed =
            parse("name = 'Porch'\nport = 8080\nrepeater = [{ host = '[::1]', port = 9000, path = '/m' }]")
                .unwrap();
        assert_eq!(legacy.repeaters(), structured.repeaters());
        assert_eq!(bracketed.repeaters(), structured.repeaters());

        let url = url::Url::parse(&structured.repeaters()[0].url()).unwrap();
        assert_eq!(url.host(), Some(url::Host::Ipv6(Ipv6Addr::LOCALHOST)));
        assert_eq!(url.port(), Some(9000));
    }

    #[test]
    fn should_use_placeholder_display_name_when_missing() {
        let raw: RawSensorConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(raw.display_name(), "<unnamed>");
    }
}
