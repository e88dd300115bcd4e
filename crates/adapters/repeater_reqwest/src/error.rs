//! Repeater adapter error types.

/// Errors raised while setting up the repeater client.
///
/// Per-request failures are reported as
/// [`RepeaterDeliveryError`](motion_domain::error::RepeaterDeliveryError)
/// instead, since they are only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum RepeaterError {
    /// The HTTP client could not be constructed.
    #[error("failed to build repeater HTTP client")]
    Client(#[source] reqwest::Error),
}
