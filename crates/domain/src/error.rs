//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MotionSensorError`] via `#[from]`.

use std::fmt;
use std::net::SocketAddr;

/// Top-level error for a single motion sensor instance.
#[derive(Debug, thiserror::Error)]
pub enum MotionSensorError {
    /// The sensor configuration failed validation.
    #[error("invalid sensor configuration")]
    Validation(#[from] ConfigValidationError),

    /// The trigger listener could not bind its socket.
    #[error("trigger listener failed to start")]
    Bind(#[from] BindError),
}

/// Why a single configuration field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    /// A required field is absent.
    #[error("is required")]
    Missing,

    /// A string field is empty (or only whitespace).
    #[error("must not be empty")]
    Empty,

    /// A numeric field could not be read as an integer.
    #[error("must be an integer, got {0:?}")]
    NotAnInteger(String),

    /// A port is outside the allowed range.
    #[error("must be between {min} and {max}, got {actual}")]
    OutOfRange {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
        /// Value that was supplied.
        actual: i64,
    },

    /// A duration must be strictly positive.
    #[error("must be a positive integer, got {0}")]
    NotPositive(i64),

    /// Not an IPv4 or IPv6 literal.
    #[error("must be an IPv4 or IPv6 address, got {0:?}")]
    InvalidIp(String),

    /// A repeater URL string could not be parsed.
    #[error("must be a valid http URL ({reason})")]
    InvalidUrl {
        /// Parser message.
        reason: String,
    },

    /// A repeater URL uses a scheme other than `http`.
    #[error("unsupported URL scheme {0:?}, only http is supported")]
    UnsupportedScheme(String),

    /// The value has a type the field never accepts (`port = true`).
    #[error("must be {expected}")]
    WrongType {
        /// Accepted shapes, e.g. `"an integer"`.
        expected: &'static str,
    },

    /// A keyword field holds an unknown keyword.
    #[error("must be one of {expected}, got {value:?}")]
    UnknownValue {
        /// Value that was supplied.
        value: String,
        /// Accepted keywords.
        expected: &'static str,
    },
}

/// A single rejected configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted/indexed path of the field, e.g. `port` or `repeater[1].host`.
    pub field: String,
    /// What is wrong with it.
    pub kind: FieldErrorKind,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// Every field-level issue found while validating one sensor configuration.
///
/// Validation never stops at the first problem; all issues are collected so
/// they can be reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    errors: Vec<FieldError>,
}

impl ConfigValidationError {
    /// Wrap a non-empty list of field errors.
    #[must_use]
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// All rejected fields, in the order they were checked.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether the given field path was rejected.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.errors.len())?;
        for (idx, err) in self.errors.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

/// The trigger listener could not acquire its socket.
#[derive(Debug, thiserror::Error)]
#[error("failed to bind {addr}")]
pub struct BindError {
    /// Address the listener tried to bind.
    pub addr: SocketAddr,
    /// Underlying OS error (address in use, permission denied, …).
    #[source]
    pub source: std::io::Error,
}

/// A best-effort repeater notification failed.
///
/// Only ever logged; never propagated to the trigger source.
#[derive(Debug, thiserror::Error)]
pub enum RepeaterDeliveryError {
    /// Connection refused, DNS failure, timeout, …
    #[error("request to {url} failed")]
    Transport {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The repeater answered with a non-2xx status.
    #[error("request to {url} returned status {status}")]
    Status {
        /// Target URL.
        url: String,
        /// HTTP status code received.
        status: u16,
    },
}
