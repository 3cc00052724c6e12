//! Periodic trigger engine.
//!
//! Tracks the heartbeat and status-check intervals against the monotonic
//! millisecond clock.  The scheduler notifies a [`SchedulerDelegate`] when
//! a trigger fires; the controller implements the delegate to emit the
//! matching host message.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │   Heartbeat (1 s)        StatusCheck (5 s)            │
//! │        │                        │                     │
//! │        ▼                        ▼                     │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                  │  │
//! │  │     (controller emits the host message)         │  │
//! │  └─────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```

use log::debug;

use crate::app::ports::{SchedulerDelegate, TriggerId};
use crate::config::{HEARTBEAT_INTERVAL_MS, STATUS_CHECK_INTERVAL_MS};

// ═══════════════════════════════════════════════════════════════
//  Periodic trigger
// ═══════════════════════════════════════════════════════════════

/// Fires at most once per `interval_ms`, measured from the previous fire.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTrigger {
    pub id: TriggerId,
    interval_ms: u32,
    last_fired_ms: u32,
}

impl PeriodicTrigger {
    /// A trigger whose reference point is time zero (boot).
    pub const fn new(id: TriggerId, interval_ms: u32) -> Self {
        Self {
            id,
            interval_ms,
            last_fired_ms: 0,
        }
    }

    /// Fire if the interval has elapsed since the last fire.
    ///
    /// Unsigned wrapping subtraction keeps this correct across the `u32`
    /// millisecond rollover.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_fired_ms) >= self.interval_ms {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_fired_ms(&self) -> u32 {
        self.last_fired_ms
    }

    /// Milliseconds until this trigger is next due (0 if already due).
    pub fn due_in(&self, now_ms: u32) -> u32 {
        self.interval_ms
            .saturating_sub(now_ms.wrapping_sub(self.last_fired_ms))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Number of periodic triggers.
const TRIGGER_COUNT: usize = 2;

/// The scheduler engine.
///
/// Decoupled from message emission: when a trigger fires it invokes the
/// [`SchedulerDelegate`] callback.  Triggers are evaluated in a fixed
/// order, heartbeat first.
pub struct Scheduler {
    triggers: [PeriodicTrigger; TRIGGER_COUNT],
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            triggers: [
                PeriodicTrigger::new(TriggerId::Heartbeat, HEARTBEAT_INTERVAL_MS),
                PeriodicTrigger::new(TriggerId::StatusCheck, STATUS_CHECK_INTERVAL_MS),
            ],
        }
    }

    /// Evaluate every trigger once.  Call once per main-loop tick.
    pub fn tick(&mut self, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for trigger in &mut self.triggers {
            if trigger.poll(now_ms) {
                debug!("Scheduler: {:?} fired at {} ms", trigger.id, now_ms);
                delegate.on_trigger_fired(trigger.id);
            }
        }
    }

    /// Milliseconds until the earliest trigger is due.
    pub fn next_due_in(&self, now_ms: u32) -> u32 {
        self.triggers
            .iter()
            .map(|t| t.due_in(now_ms))
            .min()
            .unwrap_or(0)
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&PeriodicTrigger> {
        self.triggers.iter().find(|t| t.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
