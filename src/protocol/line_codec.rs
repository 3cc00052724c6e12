//! Newline line decoder.
//!
//! Wire format: UTF-8 text, one command per line, terminated by `\n`
//! (a preceding `\r` is tolerated and removed when the line is trimmed).
//!
//! The decoder pulls bytes from the transport one at a time and stops as
//! soon as a line is complete, so any further buffered lines stay in the
//! transport for the next tick.  Partial lines survive across calls.

use log::warn;

use crate::app::ports::SerialPort;
use crate::config::MAX_LINE_LEN;

/// One received line, terminator stripped, not yet trimmed.
pub type Line = heapless::String<MAX_LINE_LEN>;

/// Streaming line decoder.
#[derive(Default)]
pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    /// Current line exceeded [`MAX_LINE_LEN`]; drop bytes until the next `\n`.
    overflowed: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from `serial` until one line is complete or the transport has
    /// nothing more to give.
    pub fn poll(&mut self, serial: &mut impl SerialPort) -> Option<Line> {
        while let Some(byte) = serial.read_byte() {
            if let Some(line) = self.feed(byte) {
                return Some(line);
            }
        }
        None
    }

    /// Feed one byte.  Returns `Some` when it completes a valid line.
    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        if byte == b'\n' {
            let bytes = core::mem::take(&mut self.buf);
            if core::mem::take(&mut self.overflowed) {
                warn!("LineDecoder: line longer than {} bytes dropped", MAX_LINE_LEN);
                return None;
            }
            return match Line::from_utf8(bytes) {
                Ok(line) => Some(line),
                Err(_) => {
                    warn!("LineDecoder: non UTF-8 line dropped");
                    None
                }
            };
        }

        if !self.overflowed && self.buf.push(byte).is_err() {
            self.overflowed = true;
            self.buf.clear();
        }
        None
    }

    /// Bytes of the line currently being assembled.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Discard any partial line (e.g. after the link re-attaches).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }
}
