//! Main-loop watchdog.
//!
//! On the board the main task subscribes to the ESP-IDF task watchdog
//! (TWDT) and panics into a reset if [`Watchdog::feed`] is not called
//! within [`WATCHDOG_TIMEOUT_MS`].  On every target the driver also
//! records the gap between feeds, so the simulator and the tests can
//! check that the loop's longest sleep ([`MAX_IDLE_MS`]) stays well
//! inside the timeout.
//!
//! [`MAX_IDLE_MS`]: crate::config::MAX_IDLE_MS

use log::{info, warn};

use crate::config::WATCHDOG_TIMEOUT_MS;

/// Gap that earns a warning: half the reset budget is gone.
const LATE_FEED_MS: u32 = WATCHDOG_TIMEOUT_MS / 2;

pub struct Watchdog {
    /// Hardware timer armed for this task.
    armed: bool,
    last_feed_ms: Option<u32>,
    longest_gap_ms: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Arm the watchdog for the calling task.  The first feed starts the
    /// gap bookkeeping.
    pub fn new() -> Self {
        let armed = arm();
        if armed {
            info!("Watchdog: armed ({} ms)", WATCHDOG_TIMEOUT_MS);
        } else {
            info!("Watchdog: tracking only ({} ms budget)", WATCHDOG_TIMEOUT_MS);
        }
        Self {
            armed,
            last_feed_ms: None,
            longest_gap_ms: 0,
        }
    }

    /// Reset the countdown.  Call once per main-loop iteration.
    pub fn feed(&mut self, now_ms: u32) {
        if let Some(last) = self.last_feed_ms {
            let gap = now_ms.wrapping_sub(last);
            if gap >= LATE_FEED_MS {
                warn!(
                    "Watchdog: {} ms since last feed (timeout {} ms)",
                    gap, WATCHDOG_TIMEOUT_MS
                );
            }
            self.longest_gap_ms = self.longest_gap_ms.max(gap);
        }
        self.last_feed_ms = Some(now_ms);
        if self.armed {
            reset();
        }
    }

    /// Longest observed interval between two feeds.
    pub fn longest_gap_ms(&self) -> u32 {
        self.longest_gap_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(target_os = "espidf")]
fn arm() -> bool {
    use esp_idf_svc::sys::{ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure};

    let cfg = esp_task_wdt_config_t {
        timeout_ms: WATCHDOG_TIMEOUT_MS,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls with a valid config; a null handle means the
    // current task.
    let (reconfigured, added) = unsafe {
        (
            esp_task_wdt_reconfigure(&cfg),
            esp_task_wdt_add(core::ptr::null_mut()),
        )
    };
    if reconfigured != ESP_OK {
        warn!("Watchdog: reconfigure returned {}", reconfigured);
    }
    if added != ESP_OK {
        warn!("Watchdog: subscribe failed ({})", added);
    }
    added == ESP_OK
}

#[cfg(not(target_os = "espidf"))]
fn arm() -> bool {
    false
}

#[cfg(target_os = "espidf")]
fn reset() {
    // SAFETY: the calling task was subscribed in `arm`.
    unsafe {
        esp_idf_svc::sys::esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn reset() {}
