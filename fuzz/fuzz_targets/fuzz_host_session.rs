//! Fuzz target: `RigController` driven by an arbitrary host session
//!
//! Input is consumed in 2-byte chunks: the first byte advances the clock
//! (in 10 ms units), the second is delivered on the serial link; a tick
//! runs after each chunk.
//!
//! Invariants checked:
//! - No panics under any input
//! - Every chip pin level matches the registry flag
//! - The LED matches the link state whenever no test run is active
//! - Output is always whole `\r\n`-terminated lines
//!
//! cargo fuzz run fuzz_host_session

#![no_main]

use std::collections::VecDeque;
use std::convert::Infallible;

use chiprig::app::ports::{SerialPort, TransportError};
use chiprig::app::service::RigController;
use chiprig::config::RigConfig;
use chiprig::drivers::status_led::StatusLed;
use chiprig::registry::ChipRegistry;
use embedded_hal::digital::{ErrorType, OutputPin};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Pin(bool);

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0 = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0 = true;
        Ok(())
    }
}

#[derive(Default)]
struct Wire {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl SerialPort for Wire {
    fn is_connected(&self) -> bool {
        true
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let config = RigConfig {
        status_push: true,
        ..RigConfig::default()
    };
    let registry = ChipRegistry::new([Pin::default(), Pin::default(), Pin::default()]);
    let mut rig = RigController::new(config, registry, StatusLed::new(Pin::default()));
    let mut wire = Wire::default();
    let mut now = 0u32;

    for chunk in data.chunks(2) {
        now = now.wrapping_add(u32::from(chunk[0]) * 10);
        if let Some(&byte) = chunk.get(1) {
            wire.rx.push_back(byte);
        }
        rig.tick(&mut wire, now);

        for chip in rig.registry().iter() {
            assert_eq!(chip.pin().0, chip.is_online());
        }
        if !rig.is_testing() {
            assert_eq!(rig.led().pin().0, rig.is_server_online());
        }
        assert!(wire.tx.is_empty() || wire.tx.ends_with(b"\r\n"));
    }
});
