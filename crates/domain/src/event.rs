//! Motion events, one per state notification.
//!
//! One event is produced every time the controller notifies its subscriber,
//! whether the state flipped or a retrigger re-emitted `true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp attached to every event.
pub type Timestamp = DateTime<Utc>;

/// A motion state notification for one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Name of the sensor that emitted the event.
    pub sensor: String,
    /// Value that was pushed to the subscriber.
    pub motion_detected: bool,
    /// When the notification happened.
    pub timestamp: Timestamp,
}

impl MotionEvent {
    /// Record a notification that happens now.
    #[must_use]
    pub fn now(sensor: impl Into<String>, motion_detected: bool) -> Self {
        Self {
            sensor: sensor.into(),
            motion_detected,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_event_with_current_time() {
        let before = Utc::now();
        let event = MotionEvent::now("Porch", true);
        let after = Utc::now();
        assert!(event.timestamp >= before);
        assert!(event.timestamp <= after);
        assert_eq!(event.sensor, "Porch");
        assert!(event.motion_detected);
    }

    #[test]
    fn should_serialize_with_snake_case_fields() {
        let event = MotionEvent::now("Porch", false);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["sensor"], "Porch");
        assert_eq!(json["motion_detected"], false);
        assert!(json["timestamp"].is_string());
    }
}
