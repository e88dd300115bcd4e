//! # motion-app
//!
//! Application layer — the motion state machine and **port definitions**
//! (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or consume:
//!   - `StateSubscriber` — receives pushed motion state changes
//!   - `RepeaterNotifier` — delivers one best-effort repeater request
//!   - `TriggerHandler` — what an inbound listener calls on every request
//! - Provide the `MotionController`: trigger → active, debounced reset back
//!   to idle, repeater fan-out, shutdown
//! - Provide the cancellable `ResetTimer` used by the controller
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `motion-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod controller;
pub mod event_bus;
pub mod ports;
pub mod reset_timer;
