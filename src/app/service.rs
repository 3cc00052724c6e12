//! Main-loop controller: the hexagonal core.
//!
//! [`RigController`] owns the chip registry, status LED, periodic
//! triggers, test runner and line decoder.  The serial link and the clock
//! are injected at call sites, making the whole protocol testable with
//! mock adapters.
//!
//! ```text
//!  SerialPort ──▶ ┌──────────────────────────────┐ ──▶ SerialPort
//!                 │        RigController         │
//!  Clock ───────▶ │ Scheduler · Registry · Tests │ ──▶ chip pins, LED
//!                 └──────────────────────────────┘
//! ```
//!
//! Each tick: first-tick banner, then (unless a test run owns the tick)
//! periodic triggers, then at most one command line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::{
    FIRMWARE_VERSION, LOOP_PERIOD_MS, MAX_IDLE_MS, RigConfig, SERIAL_WAIT_TIMEOUT_MS,
};
use crate::drivers::status_led::StatusLed;
use crate::protocol::emitter::MessageEmitter;
use crate::protocol::line_codec::LineDecoder;
use crate::registry::ChipRegistry;
use crate::scheduler::Scheduler;
use crate::test_runner::TestRunner;

use super::commands::{self, HostCommand};
use super::events::HostMessage;
use super::ports::{Clock, SchedulerDelegate, SerialPort, TriggerId};

const UNKNOWN_COMMAND_HINT: &str =
    "Unknown command. Use 'TEST<id> <chipId>' to run a test or 'STATUS' to check chip status.";

/// Controller lifecycle.  `Initializing` → `Running` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, first tick not yet run.
    Initializing,
    /// Banner sent; normal operation.
    Running,
}

// ───────────────────────────────────────────────────────────────
// Start-up
// ───────────────────────────────────────────────────────────────

/// Wait for the host to attach, giving up after [`SERIAL_WAIT_TIMEOUT_MS`].
///
/// Returns whether the link came up.  Boot continues either way.
pub fn wait_for_link(
    serial: &impl SerialPort,
    clock: &impl Clock,
    delay: &mut impl DelayNs,
) -> bool {
    let start = clock.now_ms();
    while !serial.is_connected() {
        if clock.now_ms().wrapping_sub(start) >= SERIAL_WAIT_TIMEOUT_MS {
            warn!(
                "Serial link not attached after {} ms, continuing",
                SERIAL_WAIT_TIMEOUT_MS
            );
            return false;
        }
        delay.delay_ms(LOOP_PERIOD_MS);
    }
    true
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Turns trigger fires into host messages.
struct HostNotifier<'a, S> {
    emitter: &'a mut MessageEmitter,
    serial: &'a mut S,
}

impl<S: SerialPort> SchedulerDelegate for HostNotifier<'_, S> {
    fn on_trigger_fired(&mut self, trigger: TriggerId) {
        let msg = match trigger {
            TriggerId::Heartbeat => HostMessage::Heartbeat,
            TriggerId::StatusCheck => HostMessage::StatusCheck,
        };
        self.emitter.send(&mut *self.serial, &msg);
    }
}

// ───────────────────────────────────────────────────────────────
// RigController
// ───────────────────────────────────────────────────────────────

/// The single-threaded scheduler for the whole rig.
///
/// `P` is the chip control pin type, `L` the status LED pin type.
pub struct RigController<P, L> {
    config: RigConfig,
    phase: Phase,
    registry: ChipRegistry<P>,
    led: StatusLed<L>,
    /// Host-declared link state; mirrored on the LED.
    server_online: bool,
    scheduler: Scheduler,
    runner: TestRunner,
    decoder: LineDecoder,
    emitter: MessageEmitter,
    /// Link state seen on the previous tick.
    link_attached: bool,
}

impl<P: OutputPin, L: OutputPin> RigController<P, L> {
    pub fn new(config: RigConfig, registry: ChipRegistry<P>, led: StatusLed<L>) -> Self {
        Self {
            config,
            phase: Phase::Initializing,
            registry,
            led,
            server_online: false,
            scheduler: Scheduler::new(),
            runner: TestRunner::new(),
            decoder: LineDecoder::new(),
            emitter: MessageEmitter::new(),
            link_attached: false,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one main-loop iteration at time `now_ms`.
    pub fn tick<S: SerialPort>(&mut self, serial: &mut S, now_ms: u32) {
        self.track_link(serial);

        if self.phase == Phase::Initializing {
            self.announce(serial);
            self.phase = Phase::Running;
        }

        // A test run owns the loop until it completes.
        if self.runner.is_busy() {
            self.runner.poll(
                now_ms,
                &mut self.led,
                self.server_online,
                &mut self.emitter,
                serial,
            );
            return;
        }

        let mut notifier = HostNotifier {
            emitter: &mut self.emitter,
            serial: &mut *serial,
        };
        self.scheduler.tick(now_ms, &mut notifier);

        if let Some(line) = self.decoder.poll(serial) {
            self.dispatch(line.trim(), serial, now_ms);
        }
    }

    /// Milliseconds the main loop may sleep before the next tick.  Never
    /// more than [`MAX_IDLE_MS`].
    pub fn next_wake_in(&self, now_ms: u32) -> u32 {
        let wake = match self.runner.next_wake_in(now_ms) {
            Some(ms) => ms,
            // Idle: keep polling for input at the loop period.
            None => self.scheduler.next_due_in(now_ms).min(LOOP_PERIOD_MS),
        };
        wake.min(MAX_IDLE_MS)
    }

    /// Send the current chip table to the host.
    pub fn report_chip_status<S: SerialPort>(&mut self, serial: &mut S) {
        let snapshot = self.registry.status_snapshot();
        self.emitter.send(serial, &HostMessage::ChipStatus(&snapshot));
    }

    // ── Command handling ──────────────────────────────────────

    fn dispatch<S: SerialPort>(&mut self, line: &str, serial: &mut S, now_ms: u32) {
        match commands::parse(line) {
            Ok(HostCommand::SetChipStatus { chip_id, online }) => {
                self.registry.set_status(chip_id, online);
            }
            Ok(HostCommand::ServerOnline) => self.set_server_online(true),
            Ok(HostCommand::ServerOffline) => self.set_server_online(false),
            Ok(HostCommand::RunTest {
                test_id,
                chip_id,
                args,
            }) => {
                self.echo(serial, line);
                if !args.is_empty() {
                    debug!("Test {} parameters: {}", test_id, args);
                }
                self.emitter.send_text(
                    serial,
                    &format!("Running test with ID: {test_id} on chip: {chip_id}"),
                );
                self.runner.start(
                    test_id,
                    chip_id,
                    now_ms,
                    &mut self.led,
                    self.server_online,
                    &mut self.emitter,
                    serial,
                );
            }
            Ok(HostCommand::QueryStatus) => {
                self.echo(serial, line);
                if self.config.status_push {
                    self.report_chip_status(serial);
                }
            }
            Ok(HostCommand::Unrecognized(_)) => {
                self.echo(serial, line);
                self.emitter.send_text(serial, UNKNOWN_COMMAND_HINT);
            }
            Err(e) => match e.reply() {
                Some(reply) => {
                    self.echo(serial, line);
                    self.emitter.send_text(serial, reply);
                }
                None => debug!("Dropped '{}': {}", line, e),
            },
        }
    }

    fn set_server_online(&mut self, online: bool) {
        if self.server_online != online {
            info!("Server link {}", if online { "online" } else { "offline" });
        }
        self.server_online = online;
        self.led.set(online);
    }

    /// Blank line, then the echo.
    fn echo<S: SerialPort>(&mut self, serial: &mut S, line: &str) {
        self.emitter.send_text(serial, "");
        self.emitter
            .send_text(serial, &format!("Received command: {line}"));
    }

    /// A host that (re)attaches starts with a clean line buffer.
    fn track_link<S: SerialPort>(&mut self, serial: &S) {
        let attached = serial.is_connected();
        if attached != self.link_attached {
            if attached {
                if self.decoder.pending() > 0 {
                    debug!("Discarding {} stale bytes", self.decoder.pending());
                }
                self.decoder.reset();
                info!("Host link attached");
            } else {
                info!("Host link detached");
            }
            self.link_attached = attached;
        }
    }

    fn announce<S: SerialPort>(&mut self, serial: &mut S) {
        info!(
            "{} ready, firmware {}",
            self.config.board_name, FIRMWARE_VERSION
        );
        self.emitter.send_text(
            serial,
            &format!("{} is ready for testing!", self.config.board_name),
        );
        self.emitter
            .send_text(serial, &format!("Firmware version: {FIRMWARE_VERSION}"));
    }
}

impl<P, L> RigController<P, L> {
    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_server_online(&self) -> bool {
        self.server_online
    }

    pub fn is_testing(&self) -> bool {
        self.runner.is_busy()
    }

    pub fn registry(&self) -> &ChipRegistry<P> {
        &self.registry
    }

    pub fn led(&self) -> &StatusLed<L> {
        &self.led
    }

    pub fn runner(&self) -> &TestRunner {
        &self.runner
    }

    pub fn emitter(&self) -> &MessageEmitter {
        &self.emitter
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }
}
