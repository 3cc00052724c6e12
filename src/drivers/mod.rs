//! Indicator drivers and board supervision helpers.

pub mod led_patterns;
pub mod status_led;
pub mod watchdog;
