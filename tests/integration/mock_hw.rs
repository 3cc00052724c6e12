//! Mock hardware adapters for integration tests.
//!
//! Pins remember their level and every write; the serial link is an
//! in-memory byte queue in each direction; [`Bench`] wires them into a
//! [`RigController`] and drives it on a simulated clock.

use std::collections::VecDeque;

use chiprig::app::ports::{SerialPort, TransportError};
use chiprig::app::service::RigController;
use chiprig::config::{LOOP_PERIOD_MS, RigConfig};
use chiprig::drivers::status_led::StatusLed;
use chiprig::registry::ChipRegistry;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

// ── MockPin ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    /// Every level written, in order.
    pub history: Vec<bool>,
    /// When set, writes fail and the level is left alone.
    pub broken: bool,
}

#[allow(dead_code)]
impl MockPin {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.write(true)
    }
}

impl MockPin {
    fn write(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.broken {
            return Err(ErrorKind::Other);
        }
        self.high = high;
        self.history.push(high);
        Ok(())
    }
}

// ── MockSerial ────────────────────────────────────────────────

#[derive(Debug)]
pub struct MockSerial {
    pub connected: bool,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl Default for MockSerial {
    fn default() -> Self {
        Self {
            connected: true,
            rx: VecDeque::new(),
            tx: Vec::new(),
        }
    }
}

#[allow(dead_code)]
impl MockSerial {
    /// Queue one host line (terminator added).
    pub fn push_line(&mut self, line: &str) {
        self.rx.extend(line.bytes());
        self.rx.push_back(b'\n');
    }

    /// Queue raw bytes exactly as given.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Bytes the rig has not consumed yet.
    pub fn unread(&self) -> usize {
        self.rx.len()
    }

    /// Drain everything the rig wrote, split into lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let text = String::from_utf8(std::mem::take(&mut self.tx)).expect("rig wrote UTF-8");
        assert!(
            text.is_empty() || text.ends_with("\r\n"),
            "partial line on the wire: {text:?}"
        );
        text.split_terminator("\r\n").map(str::to_owned).collect()
    }
}

impl SerialPort for MockSerial {
    fn is_connected(&self) -> bool {
        self.connected
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

// ── Bench ─────────────────────────────────────────────────────

pub type Rig = RigController<MockPin, MockPin>;

/// A controller on mock hardware with a hand-cranked clock.
pub struct Bench {
    pub rig: Rig,
    pub serial: MockSerial,
    pub now: u32,
}

#[allow(dead_code)]
impl Bench {
    pub fn new() -> Self {
        Self::with_config(RigConfig::default())
    }

    pub fn with_config(config: RigConfig) -> Self {
        Self::with_pins(config, [MockPin::default(), MockPin::default(), MockPin::default()])
    }

    pub fn with_pins(config: RigConfig, pins: [MockPin; 3]) -> Self {
        let registry = ChipRegistry::new(pins);
        Self {
            rig: RigController::new(config, registry, StatusLed::new(MockPin::default())),
            serial: MockSerial::default(),
            now: 0,
        }
    }

    /// Boot: run the first tick at t=0 and discard the banner.
    pub fn booted() -> Self {
        let mut bench = Self::new();
        bench.tick();
        bench.serial.take_lines();
        bench
    }

    pub fn tick(&mut self) {
        self.rig.tick(&mut self.serial, self.now);
    }

    /// Advance the clock by `ms`, ticking at the loop period.
    pub fn run_for(&mut self, ms: u32) {
        let end = self.now.wrapping_add(ms);
        while self.now != end {
            let step = LOOP_PERIOD_MS.min(end.wrapping_sub(self.now));
            self.now = self.now.wrapping_add(step);
            self.tick();
        }
    }

    /// Queue a line and process it on the next tick.
    pub fn command(&mut self, line: &str) -> Vec<String> {
        self.serial.push_line(line);
        self.tick();
        self.serial.take_lines()
    }

    pub fn chip_pin(&self, id: &str) -> &MockPin {
        self.rig.registry().get(id).expect("known chip").pin()
    }

    pub fn led_pin(&self) -> &MockPin {
        self.rig.led().pin()
    }
}
