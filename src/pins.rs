//! GPIO / peripheral pin assignments for the ChipRig board.
//!
//! Single source of truth: the chip roster and the ESP-IDF bring-up code
//! reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Status LED: server link indicator, also blinked at the start of a test run.
pub const STATUS_LED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Chip control outputs (HIGH = chip online)
// ---------------------------------------------------------------------------

pub const CHIP_LDPC1_GPIO: i32 = 2;
pub const CHIP_LDPC2_GPIO: i32 = 3;
pub const CHIP_LDPC3_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Host serial link (UART0)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
