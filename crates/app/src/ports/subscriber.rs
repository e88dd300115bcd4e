//! Subscriber port: push side of the motion state.

/// Receives every motion state notification of one controller.
///
/// Called synchronously while the controller holds its state lock, so
/// notifications arrive in the order the state changed. Implementations must
/// return quickly and must not call back into the controller.
pub trait StateSubscriber: Send + Sync + 'static {
    /// The controller pushed a new `motion_detected` value.
    fn on_state_change(&self, motion_detected: bool);
}

impl<F> StateSubscriber for F
where
    F: Fn(bool) + Send + Sync + 'static,
{
    fn on_state_change(&self, motion_detected: bool) {
        self(motion_detected);
    }
}
