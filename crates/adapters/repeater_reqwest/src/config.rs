//! Repeater client configuration.

use serde::Deserialize;

/// Settings shared by every repeater request of the process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepeaterConfig {
    /// Whole-request timeout (connect + response), in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: concat!("http-motion-sensor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
