//! ChipRig Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartSerial / StdioSerial   SystemClock   PinDriver / SimPin   │
//! │  (SerialPort)               (Clock)       (OutputPin)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            RigController (pure logic)                  │    │
//! │  │  Scheduler · ChipRegistry · TestRunner · LineDecoder   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Watchdog (fed every iteration)                                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the board this drives UART0 and the chip/LED GPIOs.  On any other
//! target it runs the same controller as a simulator: host commands on
//! stdin, board output on stdout, logs on stderr.  The simulator accepts an
//! optional path to a JSON [`RigConfig`] as its first argument.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::info;

use chiprig::adapters::serial;
use chiprig::adapters::time::SystemClock;
use chiprig::app::ports::{Clock, SerialPort};
use chiprig::app::service::{RigController, wait_for_link};
use chiprig::config::{FIRMWARE_VERSION, RigConfig};
use chiprig::drivers::status_led::StatusLed;
use chiprig::drivers::watchdog::Watchdog;
use chiprig::registry::{CHIP_COUNT, ChipRegistry};

// ── Main loop (target independent) ────────────────────────────

fn run<P, L, S>(
    config: RigConfig,
    chip_pins: [P; CHIP_COUNT],
    led_pin: L,
    mut serial: S,
) -> Result<()>
where
    P: OutputPin,
    L: OutputPin,
    S: SerialPort,
{
    let clock = SystemClock::new();
    let mut delay = clock;

    info!(
        "ChipRig v{} on {} ({} baud)",
        FIRMWARE_VERSION, config.board_name, config.baud_rate
    );

    // Pins go low before the host can see us.
    let registry = ChipRegistry::new(chip_pins);
    let led = StatusLed::new(led_pin);

    if wait_for_link(&serial, &clock, &mut delay) {
        info!("Serial link attached");
    }

    let mut controller = RigController::new(config, registry, led);
    let mut watchdog = Watchdog::new();
    info!("System ready. Entering main loop.");

    loop {
        let now = clock.now_ms();
        controller.tick(&mut serial, now);
        watchdog.feed(clock.now_ms());

        let idle = controller.next_wake_in(clock.now_ms());
        if idle > 0 {
            delay.delay_ms(idle);
        }
    }
}

// ── ESP-IDF entry ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
    use esp_idf_hal::units::Hertz;

    use chiprig::error::Error;
    use chiprig::pins;
    use chiprig::registry::ROSTER;

    fn output(gpio: i32, label: &'static str) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
        // SAFETY: each GPIO number is claimed once below and its
        // `Peripherals` pin field is never touched.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        let driver = PinDriver::output(pin).map_err(|_| Error::Pin(label))?;
        Ok(driver)
    }

    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = RigConfig::default();
    config.validate()?;

    let peripherals = Peripherals::take()?;
    let chip_pins = [
        output(ROSTER[0].gpio, ROSTER[0].id)?,
        output(ROSTER[1].gpio, ROSTER[1].id)?,
        output(ROSTER[2].gpio, ROSTER[2].id)?,
    ];
    let led_pin = output(pins::STATUS_LED_GPIO, "status LED")?;

    // SAFETY: UART pins are claimed once, here.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::UART_TX_GPIO),
            AnyIOPin::new(pins::UART_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart0,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.baud_rate)),
    )
    .map_err(|_| Error::Init("UART0"))?;

    run(config, chip_pins, led_pin, serial::UartSerial::new(uart))
}

// ── Host simulator entry ──────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use anyhow::Context;
    use chiprig::adapters::gpio::SimPin;
    use chiprig::registry::ROSTER;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
            let config = RigConfig::from_json(&bytes).with_context(|| format!("parsing {path}"))?;
            info!("Config loaded from {}", path);
            config
        }
        None => RigConfig::default(),
    };

    let chip_pins = ROSTER.map(|chip| SimPin::new(chip.id));
    let serial = serial::StdioSerial::spawn()?;

    run(config, chip_pins, SimPin::new("led"), serial)
}
