//! # motion-adapter-http-axum
//!
//! Trigger listener built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Bind `(bind_ip, port)` and treat **every** request, whatever its
//!   method, path or body, as one motion trigger
//! - Acknowledge each trigger with `200 text/plain` echoing the requested
//!   path
//! - Keep serving when a request handler panics (the request gets a `500`)
//! - Release the socket on stop, on drop, and when the controller shuts down
//!
//! The request is a signal, not an API call: there is no routing, no input
//! validation and no authentication.
//!
//! ## Dependency rule
//! Depends on `motion-app` (for the [`TriggerHandler`](motion_app::ports::TriggerHandler)
//! port) and `motion-domain` (for error types). Never leaks axum types into
//! the domain.

mod error;
pub mod listener;
pub mod router;

pub use listener::TriggerListener;
