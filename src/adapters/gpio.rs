//! Simulated output pins for the host build.
//!
//! Each pin remembers its level and logs transitions under its label, so a
//! simulator session shows chip power and LED activity on stderr.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::debug;

pub struct SimPin {
    label: &'static str,
    high: bool,
}

impl SimPin {
    pub fn new(label: &'static str) -> Self {
        Self { label, high: false }
    }

    fn drive(&mut self, high: bool) {
        if self.high != high {
            debug!("GPIO {} -> {}", self.label, if high { "HIGH" } else { "LOW" });
        }
        self.high = high;
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}
