//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the host protocol for the test rig: inbound command
//! grammar, outbound message model, and the main-loop controller.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
