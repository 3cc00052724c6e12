//! Diagnostic test runner.
//!
//! A run is a fixed timeline of steps measured from the moment it starts:
//!
//! ```text
//!  0 ms            test_started, LED on
//!  0 – 2000 ms     5 × (200 ms on, 200 ms off) blink
//!  2000 ms         LED back to link state, progress 1
//!  3000 … 11000 ms progress 2 … 10
//!  12000 ms        test_completed
//! ```
//!
//! The runner never blocks: the main loop calls [`TestRunner::poll`] and
//! every step whose offset has elapsed is executed in order.  Once started,
//! a run cannot be cancelled and has no failure path; while it is active
//! the controller does nothing else.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::events::HostMessage;
use crate::app::ports::SerialPort;
use crate::config::{
    BLINK_COUNT, BLINK_HALF_PERIOD_MS, MAX_LINE_LEN, PROGRESS_COUNT, PROGRESS_INTERVAL_MS,
};
use crate::drivers::led_patterns::BlinkPattern;
use crate::drivers::status_led::StatusLed;
use crate::protocol::emitter::MessageEmitter;

/// Chip identifier as received from the host.
pub type ChipId = heapless::String<MAX_LINE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Drive blink edge `n`.
    Blink(u32),
    /// Hand the LED back to the link indicator.
    RestoreLed,
    /// Emit progress record `n` (1-based).
    Progress(u8),
    /// Emit `test_completed` and finish.
    Complete,
}

struct ActiveRun {
    test_id: u32,
    chip_id: ChipId,
    started_ms: u32,
    next: Step,
}

/// Steps through one diagnostic run at a time.
pub struct TestRunner {
    blink: BlinkPattern,
    active: Option<ActiveRun>,
    completed: u32,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    pub fn new() -> Self {
        Self {
            blink: BlinkPattern::new(BLINK_COUNT, BLINK_HALF_PERIOD_MS),
            active: None,
            completed: 0,
        }
    }

    /// Whether a run is in progress.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// `(test_id, chip_id)` of the run in progress.
    pub fn current(&self) -> Option<(u32, &str)> {
        self.active
            .as_ref()
            .map(|run| (run.test_id, run.chip_id.as_str()))
    }

    /// Runs finished since boot.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Begin a run and execute its time-zero steps (`test_started`, first
    /// LED edge).  Returns `false` if a run is already active.
    #[allow(clippy::too_many_arguments)]
    pub fn start<P: OutputPin, S: SerialPort>(
        &mut self,
        test_id: u32,
        chip_id: &str,
        now_ms: u32,
        led: &mut StatusLed<P>,
        link_online: bool,
        emitter: &mut MessageEmitter,
        serial: &mut S,
    ) -> bool {
        if let Some((busy_id, _)) = self.current() {
            warn!("TestRunner: test {} still running, {} not started", busy_id, test_id);
            return false;
        }
        let Ok(chip_id_owned) = ChipId::try_from(chip_id) else {
            warn!("TestRunner: chip id too long, test {} not started", test_id);
            return false;
        };

        info!("TestRunner: test {} started on {}", test_id, chip_id);
        emitter.send(serial, &HostMessage::TestStarted { test_id, chip_id });

        let first = if self.blink.edges() > 0 {
            Step::Blink(0)
        } else {
            Step::RestoreLed
        };
        self.active = Some(ActiveRun {
            test_id,
            chip_id: chip_id_owned,
            started_ms: now_ms,
            next: first,
        });
        self.poll(now_ms, led, link_online, emitter, serial);
        true
    }

    /// Execute every step that is due at `now_ms`.
    pub fn poll<P: OutputPin, S: SerialPort>(
        &mut self,
        now_ms: u32,
        led: &mut StatusLed<P>,
        link_online: bool,
        emitter: &mut MessageEmitter,
        serial: &mut S,
    ) {
        while let Some(run) = self.active.as_mut() {
            let elapsed = now_ms.wrapping_sub(run.started_ms);
            if elapsed < step_offset(&self.blink, run.next) {
                return;
            }

            let (test_id, chip_id) = (run.test_id, run.chip_id.as_str());
            run.next = match run.next {
                Step::Blink(edge) => {
                    led.set(BlinkPattern::edge_level(edge));
                    if edge + 1 < self.blink.edges() {
                        Step::Blink(edge + 1)
                    } else {
                        Step::RestoreLed
                    }
                }
                Step::RestoreLed => {
                    led.set(link_online);
                    if PROGRESS_COUNT > 0 {
                        Step::Progress(1)
                    } else {
                        Step::Complete
                    }
                }
                Step::Progress(count) => {
                    emitter.send(
                        serial,
                        &HostMessage::TestProgress {
                            test_id,
                            chip_id,
                            count,
                        },
                    );
                    if count < PROGRESS_COUNT {
                        Step::Progress(count + 1)
                    } else {
                        Step::Complete
                    }
                }
                Step::Complete => {
                    emitter.send(serial, &HostMessage::TestCompleted { test_id, chip_id });
                    info!("TestRunner: test {} completed on {}", test_id, chip_id);
                    self.active = None;
                    self.completed = self.completed.wrapping_add(1);
                    return;
                }
            };
        }
    }

    /// Milliseconds until the next step is due, `None` when idle.
    pub fn next_wake_in(&self, now_ms: u32) -> Option<u32> {
        self.active.as_ref().map(|run| {
            let elapsed = now_ms.wrapping_sub(run.started_ms);
            step_offset(&self.blink, run.next).saturating_sub(elapsed)
        })
    }

    /// Length of a complete run.
    pub fn run_duration_ms(&self) -> u32 {
        step_offset(&self.blink, Step::Complete)
    }
}

/// Offset of `step` from the start of the run.
fn step_offset(blink: &BlinkPattern, step: Step) -> u32 {
    let progress_start = blink.duration_ms();
    match step {
        Step::Blink(edge) => blink.edge_offset_ms(edge),
        Step::RestoreLed => progress_start,
        Step::Progress(count) => progress_start + (u32::from(count) - 1) * PROGRESS_INTERVAL_MS,
        Step::Complete => progress_start + u32::from(PROGRESS_COUNT) * PROGRESS_INTERVAL_MS,
    }
}
