//! # motion-domain
//!
//! Pure domain model for the HTTP motion sensor.
//!
//! ## Responsibilities
//! - Foundational types: error conventions
//! - Define the validated **sensor configuration** ([`sensor::SensorConfig`],
//!   [`sensor::RepeaterTarget`]) and the accessory metadata shown to the hub
//! - Turn raw, loosely-typed configuration ([`config::RawSensorConfig`]) into
//!   the validated form, reporting every invalid field at once
//! - Define **motion events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO runtimes.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod config;
pub mod error;
pub mod event;
pub mod sensor;
