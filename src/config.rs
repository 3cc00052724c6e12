//! System configuration parameters
//!
//! Protocol timing is fixed: the host tooling is written against these
//! exact values, so they live here as constants rather than in
//! [`RigConfig`].  The config struct holds only the board-level knobs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// --- Timing (ms) ---

/// Heartbeat emission interval.
pub const HEARTBEAT_INTERVAL_MS: u32 = 1_000;
/// Status-check emission interval.
pub const STATUS_CHECK_INTERVAL_MS: u32 = 5_000;
/// How long start-up waits for the serial link before carrying on.
pub const SERIAL_WAIT_TIMEOUT_MS: u32 = 5_000;

// --- Test run ---

/// On/off cycles of the liveness blink at the start of a test run.
pub const BLINK_COUNT: u8 = 5;
/// Duration of one half of a blink cycle.
pub const BLINK_HALF_PERIOD_MS: u32 = 200;
/// Number of progress records emitted per test run.
pub const PROGRESS_COUNT: u8 = 10;
/// Spacing between progress records.
pub const PROGRESS_INTERVAL_MS: u32 = 1_000;

// --- Main loop ---

/// Idle sleep between ticks when nothing is scheduled sooner.
pub const LOOP_PERIOD_MS: u32 = 10;
/// Longest sleep the main loop takes between ticks.  A test run waits
/// up to one progress interval between steps.
pub const MAX_IDLE_MS: u32 = PROGRESS_INTERVAL_MS;
/// Task watchdog timeout: several missed feeds before the board resets.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5 * MAX_IDLE_MS;

const _: () = assert!(MAX_IDLE_MS >= LOOP_PERIOD_MS);
const _: () = assert!(WATCHDOG_TIMEOUT_MS >= 4 * MAX_IDLE_MS);

/// Longest accepted command line, excluding the terminator.
pub const MAX_LINE_LEN: usize = 128;

/// Firmware version reported in the readiness banner, `major.minor`.
pub const FIRMWARE_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);

/// Board-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Board name shown in the readiness banner.
    pub board_name: heapless::String<32>,
    /// Serial link baud rate.
    pub baud_rate: u32,
    /// Answer `STATUS` with a `chip_status` report instead of ignoring it.
    pub status_push: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        let mut board_name = heapless::String::new();
        // Fits: 10 bytes into a 32-byte buffer.
        let _ = board_name.push_str("Teensy 4.1");
        Self {
            board_name,
            baud_rate: 115_200,
            status_push: false,
        }
    }
}

impl RigConfig {
    /// Parse a JSON config.  Missing fields take their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the firmware cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be non-zero"));
        }
        if self.board_name.is_empty() {
            return Err(Error::Config("board_name must not be empty"));
        }
        Ok(())
    }
}
