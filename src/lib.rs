//! ChipRig firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for ESP-IDF requires `--features espidf`");

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod test_runner;

pub mod adapters;
pub mod drivers;
