//! Trigger port, driven by inbound listeners.

use tokio::sync::watch;

/// Receives trigger signals from an inbound listener.
///
/// Implemented by [`MotionController`](crate::controller::MotionController);
/// listener adapters are generic over it so they can be tested with stubs.
pub trait TriggerHandler: Send + Sync + 'static {
    /// Motion was sensed. Must not block.
    fn handle_trigger(&self);

    /// A receiver whose value turns `true` once the handler is shut down.
    ///
    /// Listeners watch it to stop accepting connections.
    fn shutdown_signal(&self) -> watch::Receiver<bool>;
}

impl<T: TriggerHandler> TriggerHandler for std::sync::Arc<T> {
    fn handle_trigger(&self) {
        (**self).handle_trigger();
    }

    fn shutdown_signal(&self) -> watch::Receiver<bool> {
        (**self).shutdown_signal()
    }
}
