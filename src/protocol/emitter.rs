//! Message emitter: serialises host messages onto the serial link.
//!
//! Every call produces exactly one complete line (`\r\n` terminated) and
//! flushes before returning.  There is no batching and no retry: a write
//! that fails is logged, counted, and dropped.

use log::warn;

use crate::app::events::HostMessage;
use crate::app::ports::{SerialPort, TransportError};

const LINE_END: &[u8] = b"\r\n";

#[derive(Debug, Default)]
pub struct MessageEmitter {
    sent: u32,
    dropped: u32,
}

impl MessageEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a structured record as one JSON line.
    pub fn send(&mut self, serial: &mut impl SerialPort, msg: &HostMessage<'_>) {
        match serde_json::to_vec(msg) {
            Ok(json) => self.write_line(serial, &json),
            Err(e) => {
                warn!("Emitter: failed to serialise {:?}: {}", msg, e);
                self.dropped = self.dropped.wrapping_add(1);
            }
        }
    }

    /// Send a plain diagnostic text line.
    pub fn send_text(&mut self, serial: &mut impl SerialPort, text: &str) {
        self.write_line(serial, text.as_bytes());
    }

    /// Lines written successfully.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Lines lost to transport or serialisation errors.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn write_line(&mut self, serial: &mut impl SerialPort, payload: &[u8]) {
        match Self::write_flushed(serial, payload) {
            Ok(()) => self.sent = self.sent.wrapping_add(1),
            Err(e) => {
                warn!("Emitter: line dropped ({})", e);
                self.dropped = self.dropped.wrapping_add(1);
            }
        }
    }

    fn write_flushed(serial: &mut impl SerialPort, payload: &[u8]) -> Result<(), TransportError> {
        serial.write_all(payload)?;
        serial.write_all(LINE_END)?;
        serial.flush()
    }
}
