//! Chip registry: the fixed roster of supervised LDPC chips.
//!
//! Each chip owns one control output.  The output is the physical truth of
//! the chip's state: driven HIGH iff the chip is marked online.  The roster
//! is built once at boot and never grows or shrinks.

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};
use serde::Serialize;

use crate::pins;

/// Number of chips on the board.
pub const CHIP_COUNT: usize = 3;

/// Static description of one roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub gpio: i32,
}

/// The board's chips, in registration order.
pub const ROSTER: [ChipSpec; CHIP_COUNT] = [
    ChipSpec {
        id: "ldpc1",
        name: "LDPC Chip 1",
        gpio: pins::CHIP_LDPC1_GPIO,
    },
    ChipSpec {
        id: "ldpc2",
        name: "LDPC Chip 2",
        gpio: pins::CHIP_LDPC2_GPIO,
    },
    ChipSpec {
        id: "ldpc3",
        name: "LDPC Chip 3",
        gpio: pins::CHIP_LDPC3_GPIO,
    },
];

/// Reported state of one chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChipState {
    pub id: &'static str,
    #[serde(rename = "status", serialize_with = "serialize_online")]
    pub online: bool,
}

fn serialize_online<S: serde::Serializer>(online: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *online { "online" } else { "offline" })
}

/// A live roster entry.
pub struct Chip<P> {
    spec: ChipSpec,
    pin: P,
    online: bool,
}

impl<P> Chip<P> {
    pub fn id(&self) -> &'static str {
        self.spec.id
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

/// Fixed-size chip table.
pub struct ChipRegistry<P> {
    chips: [Chip<P>; CHIP_COUNT],
}

impl<P: OutputPin> ChipRegistry<P> {
    /// Build the roster over `pins` (same order as [`ROSTER`]) and drive
    /// every output LOW.  All chips start offline.
    pub fn new(pins: [P; CHIP_COUNT]) -> Self {
        let mut specs = ROSTER.into_iter();
        let chips = pins.map(|mut pin| {
            // `pins` and `ROSTER` have the same length.
            let spec = specs.next().unwrap_or(ROSTER[0]);
            if let Err(e) = pin.set_low() {
                warn!("Registry: failed to drive {} low at boot: {:?}", spec.id, e);
            }
            Chip {
                spec,
                pin,
                online: false,
            }
        });
        info!("Registry: {} chips registered, all offline", CHIP_COUNT);
        Self { chips }
    }

    /// Mark chip `id` online or offline and drive its output to match.
    ///
    /// Returns `false` if no chip has that id; the table and every pin are
    /// left untouched.  A failed pin write also returns `false` and keeps
    /// the old flag, so flag and pin never disagree.
    pub fn set_status(&mut self, id: &str, online: bool) -> bool {
        let Some(chip) = self.chips.iter_mut().find(|c| c.spec.id == id) else {
            debug!("Registry: no chip '{}', ignoring", id);
            return false;
        };

        let result = if online {
            chip.pin.set_high()
        } else {
            chip.pin.set_low()
        };
        match result {
            Ok(()) => {
                chip.online = online;
                info!(
                    "Registry: {} -> {}",
                    chip.spec.id,
                    if online { "online" } else { "offline" }
                );
                true
            }
            Err(e) => {
                warn!("Registry: pin write for {} failed: {:?}", chip.spec.id, e);
                false
            }
        }
    }
}

impl<P> ChipRegistry<P> {
    /// `(id, online)` for every chip, in registration order.
    pub fn status_snapshot(&self) -> [ChipState; CHIP_COUNT] {
        core::array::from_fn(|i| ChipState {
            id: self.chips[i].spec.id,
            online: self.chips[i].online,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Chip<P>> {
        self.chips.iter().find(|c| c.spec.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chip<P>> {
        self.chips.iter()
    }
}
