//! In-process event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use motion_domain::event::MotionEvent;

use crate::ports::StateSubscriber;

/// In-process bus carrying [`MotionEvent`]s from every sensor.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<MotionEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MotionEvent> {
        self.sender.subscribe()
    }

    /// A [`StateSubscriber`] that publishes one sensor's notifications on
    /// this bus.
    #[must_use]
    pub fn publisher(&self, sensor: impl Into<String>) -> SensorPublisher {
        SensorPublisher {
            sensor: sensor.into(),
            sender: self.sender.clone(),
        }
    }
}

/// Bridges a controller's push notifications onto the bus.
pub struct SensorPublisher {
    sensor: String,
    sender: broadcast::Sender<MotionEvent>,
}

impl StateSubscriber for SensorPublisher {
    fn on_state_change(&self, motion_detected: bool) {
        // broadcast::send fails only when there are zero receivers,
        // which is fine; the event is dropped.
        let _ = self
            .sender
            .send(MotionEvent::now(self.sensor.clone(), motion_detected));
    }
}
