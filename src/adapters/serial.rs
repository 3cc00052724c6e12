//! Host serial link adapters.
//!
//! - **`target_os = "espidf"`**: [`UartSerial`] over an ESP-IDF
//!   `UartDriver` (non-blocking reads, blocking writes, flush waits for the
//!   TX FIFO to drain).
//! - **`not(target_os = "espidf")`**: [`StdioSerial`], where stdin is the host's
//!   transmit line, stdout the board's.  A reader thread feeds stdin bytes
//!   through a channel so `read_byte` never blocks the loop.

use crate::app::ports::{SerialPort, TransportError};

// ───────────────────────────────────────────────────────────────
// ESP-IDF UART
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use uart::UartSerial;

#[cfg(target_os = "espidf")]
mod uart {
    use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
    use esp_idf_hal::uart::UartDriver;

    use super::{SerialPort, TransportError};

    pub struct UartSerial<'d> {
        uart: UartDriver<'d>,
    }

    impl<'d> UartSerial<'d> {
        pub fn new(uart: UartDriver<'d>) -> Self {
            Self { uart }
        }
    }

    impl SerialPort for UartSerial<'_> {
        /// A UART has no attach signal; the line is always considered up.
        fn is_connected(&self) -> bool {
            true
        }

        fn read_byte(&mut self) -> Option<u8> {
            let mut byte = [0u8; 1];
            match self.uart.read(&mut byte, NON_BLOCK) {
                Ok(1) => Some(byte[0]),
                _ => None,
            }
        }

        fn write_all(&mut self, mut data: &[u8]) -> Result<(), TransportError> {
            while !data.is_empty() {
                match self.uart.write(data) {
                    Ok(0) | Err(_) => return Err(TransportError::WriteFailed),
                    Ok(n) => data = &data[n..],
                }
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), TransportError> {
            self.uart
                .wait_tx_done(BLOCK)
                .map_err(|_| TransportError::FlushFailed)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host stdio
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use stdio::StdioSerial;

#[cfg(not(target_os = "espidf"))]
mod stdio {
    use std::io::{Read, Write};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::thread;

    use log::info;

    use super::{SerialPort, TransportError};
    use crate::error::{Error, Result};

    pub struct StdioSerial {
        rx: Receiver<u8>,
        attached: Arc<AtomicBool>,
    }

    impl StdioSerial {
        /// Spawn the stdin reader.  The link counts as attached until
        /// stdin reaches EOF.
        pub fn spawn() -> Result<Self> {
            let (tx, rx) = mpsc::channel();
            let attached = Arc::new(AtomicBool::new(true));
            let flag = Arc::clone(&attached);

            thread::Builder::new()
                .name("stdin-reader".into())
                .spawn(move || {
                    let stdin = std::io::stdin();
                    for byte in stdin.lock().bytes() {
                        let Ok(byte) = byte else { break };
                        if tx.send(byte).is_err() {
                            break;
                        }
                    }
                    info!("stdin closed, host detached");
                    flag.store(false, Ordering::Release);
                })
                .map_err(|_| Error::Init("stdin reader thread"))?;

            Ok(Self { rx, attached })
        }
    }

    impl SerialPort for StdioSerial {
        fn is_connected(&self) -> bool {
            self.attached.load(Ordering::Acquire)
        }

        fn read_byte(&mut self) -> Option<u8> {
            match self.rx.try_recv() {
                Ok(byte) => Some(byte),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            }
        }

        fn write_all(&mut self, data: &[u8]) -> core::result::Result<(), TransportError> {
            std::io::stdout()
                .lock()
                .write_all(data)
                .map_err(|_| TransportError::WriteFailed)
        }

        fn flush(&mut self) -> core::result::Result<(), TransportError> {
            std::io::stdout()
                .lock()
                .flush()
                .map_err(|_| TransportError::FlushFailed)
        }
    }
}
