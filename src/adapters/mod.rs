//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter  | Implements          | Connects to                    |
//! |----------|---------------------|--------------------------------|
//! | `serial` | SerialPort          | ESP-IDF UART / host stdio      |
//! | `time`   | Clock, `DelayNs`    | ESP32 system timer / `Instant` |
//! | `gpio`   | `OutputPin` (sim)   | In-memory pin, logged          |
//!
//! On the board, chip and LED pins are ESP-IDF `PinDriver`s, which already
//! implement `embedded_hal::digital::OutputPin`.

#[cfg(not(target_os = "espidf"))]
pub mod gpio;
pub mod serial;
pub mod time;
