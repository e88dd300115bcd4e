//! Repeater port: outbound best-effort notification of downstream endpoints.

use std::future::Future;

use motion_domain::error::RepeaterDeliveryError;
use motion_domain::sensor::RepeaterTarget;

/// Delivers one request to a repeater target.
///
/// The controller spawns one call per target and never awaits it on the
/// trigger path; errors are logged by the controller, never retried.
pub trait RepeaterNotifier: Send + Sync + 'static {
    /// Issue a `GET` to [`RepeaterTarget::url`], with an `Authorization`
    /// header when [`RepeaterTarget::auth`] is set.
    fn notify(
        &self,
        target: &RepeaterTarget,
    ) -> impl Future<Output = Result<(), RepeaterDeliveryError>> + Send;
}

impl<T: RepeaterNotifier> RepeaterNotifier for std::sync::Arc<T> {
    fn notify(
        &self,
        target: &RepeaterTarget,
    ) -> impl Future<Output = Result<(), RepeaterDeliveryError>> + Send {
        (**self).notify(target)
    }
}
