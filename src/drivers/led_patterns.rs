//! Blink pattern for the status LED.
//!
//! A finite square wave: `count` on/off cycles, each half lasting
//! `half_period_ms`.  The pattern is pure arithmetic over edge numbers, so
//! the caller decides when to step it and which pin to drive.
//!
//! ```text
//!  on  ┌──┐  ┌──┐  ┌──┐  ┌──┐  ┌──┐
//!  off ┘  └──┘  └──┘  └──┘  └──┘  └── done
//!      0  200 400 ...             2000 ms   (5 × 200 ms)
//! ```

/// Finite on/off blink pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    pub count: u8,
    pub half_period_ms: u32,
}

impl BlinkPattern {
    pub const fn new(count: u8, half_period_ms: u32) -> Self {
        Self {
            count,
            half_period_ms,
        }
    }

    /// Number of LED edges the pattern produces (one per half-cycle).
    pub const fn edges(&self) -> u32 {
        self.count as u32 * 2
    }

    /// Total length of the pattern.
    pub const fn duration_ms(&self) -> u32 {
        self.edges() * self.half_period_ms
    }

    /// Offset of edge `n` from the pattern start.
    pub const fn edge_offset_ms(&self, n: u32) -> u32 {
        n * self.half_period_ms
    }

    /// LED level after edge `n`: even edges switch on, odd edges off.
    pub const fn edge_level(n: u32) -> bool {
        n % 2 == 0
    }
}
