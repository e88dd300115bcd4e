//! Port definitions — traits at the boundary of the motion controller.
//!
//! Ports are defined here (in `app`) so that both the controller and the
//! adapters can depend on them without creating circular dependencies.

pub mod repeater;
pub mod subscriber;
pub mod trigger;

pub use repeater::RepeaterNotifier;
pub use subscriber::StateSubscriber;
pub use trigger::TriggerHandler;
