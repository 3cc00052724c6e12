//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RigController (domain)
//! ```
//!
//! Driven adapters (serial link, clock) implement these traits.  The
//! [`RigController`](super::service::RigController) consumes them via
//! generics, so the domain core never touches hardware directly.  GPIO goes
//! through [`embedded_hal::digital::OutputPin`] rather than a port of our own.

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: host link ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented, non-blocking serial link to the host.
pub trait SerialPort {
    /// Whether the host side of the link is attached.  Adapters without
    /// a notion of attachment (plain UART) always return `true`.
    fn is_connected(&self) -> bool;

    /// Take the next received byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write every byte of `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Block until everything written so far has left the device.
    fn flush(&mut self) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
///
/// The value wraps at `u32::MAX` (~49.7 days); every consumer compares
/// timestamps with `wrapping_sub`, so the wrap is harmless.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from message emission)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a periodic trigger fires.
///
/// The scheduler only does the timing arithmetic; the controller decides
/// what a fire means (today: emit the matching host message).
pub trait SchedulerDelegate {
    fn on_trigger_fired(&mut self, trigger: TriggerId);
}

/// The periodic events tracked by the [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerId {
    /// Liveness beacon to the host.
    Heartbeat,
    /// Request for the host to re-announce its link state.
    StatusCheck,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SerialPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The link is gone (host closed the port, stdout closed, …).
    Disconnected,
    /// The driver rejected or truncated a write.
    WriteFailed,
    /// Waiting for the transmit buffer to drain failed.
    FlushFailed,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::FlushFailed => write!(f, "flush failed"),
        }
    }
}
