//! # motion-sensord
//!
//! Library half of the daemon so the wiring can be exercised from
//! integration tests.
//!
//! - [`config`]: TOML file plus environment overrides
//! - [`accessory`]: one running sensor (controller + trigger listener)
//! - [`platform`]: every configured sensor, started independently

pub mod accessory;
pub mod config;
pub mod platform;
