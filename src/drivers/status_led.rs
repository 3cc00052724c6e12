//! Status LED driver.
//!
//! One discrete LED on [`STATUS_LED_GPIO`](crate::pins::STATUS_LED_GPIO).
//! Steady state mirrors the server link; a test run borrows it for the
//! start-of-run blink and hands it back afterwards.
//!
//! ## Dual-target design
//!
//! Generic over [`OutputPin`]: an ESP-IDF `PinDriver` on the board, an
//! in-memory pin on host/test.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("StatusLed: pin write failed: {:?}", e),
        }
    }
}

impl<P> StatusLed<P> {
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}
