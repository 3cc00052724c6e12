//! Controller behaviour on an idle rig: banner, periodic messages, command
//! intake and the chip / link state commands.

use chiprig::app::service::Phase;
use chiprig::config::{FIRMWARE_VERSION, RigConfig};

use super::mock_hw::{Bench, MockPin};

const HEARTBEAT: &str = r#"{"type":"heartbeat"}"#;
const STATUS_CHECK: &str = r#"{"type":"status_check"}"#;

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn banner_is_sent_once_on_first_tick() {
    let mut bench = Bench::new();
    assert_eq!(bench.rig.phase(), Phase::Initializing);

    bench.tick();
    assert_eq!(
        bench.serial.take_lines(),
        [
            "Teensy 4.1 is ready for testing!".to_owned(),
            format!("Firmware version: {FIRMWARE_VERSION}"),
        ]
    );
    assert_eq!(bench.rig.phase(), Phase::Running);

    bench.run_for(500);
    assert!(bench.serial.take_lines().is_empty());
}

#[test]
fn banner_uses_configured_board_name() {
    let config = RigConfig::from_json(br#"{"board_name":"Bench rig 2"}"#).unwrap();
    let mut bench = Bench::with_config(config);
    bench.tick();
    assert_eq!(bench.serial.take_lines()[0], "Bench rig 2 is ready for testing!");
}

#[test]
fn chips_and_led_start_low() {
    let bench = Bench::new();
    for id in ["ldpc1", "ldpc2", "ldpc3"] {
        assert!(!bench.chip_pin(id).high);
        assert!(!bench.rig.registry().get(id).unwrap().is_online());
    }
    assert!(!bench.led_pin().high);
    assert!(!bench.rig.is_server_online());
}

// ── Periodic messages ─────────────────────────────────────────

#[test]
fn heartbeat_every_second_status_check_every_five() {
    let mut bench = Bench::booted();
    bench.run_for(10_000);
    let lines = bench.serial.take_lines();

    let heartbeats = lines.iter().filter(|l| *l == HEARTBEAT).count();
    let checks = lines.iter().filter(|l| *l == STATUS_CHECK).count();
    assert_eq!(heartbeats, 10);
    assert_eq!(checks, 2);
    assert_eq!(lines.len(), 12);
}

#[test]
fn heartbeat_precedes_status_check_in_the_same_tick() {
    let mut bench = Bench::booted();
    bench.run_for(4_990);
    bench.serial.take_lines();
    bench.run_for(10);
    assert_eq!(bench.serial.take_lines(), [HEARTBEAT, STATUS_CHECK]);
}

#[test]
fn stalled_loop_fires_each_trigger_once() {
    let mut bench = Bench::booted();
    bench.now = 7_500;
    bench.tick();
    assert_eq!(bench.serial.take_lines(), [HEARTBEAT, STATUS_CHECK]);
    bench.now = 8_000;
    bench.tick();
    assert!(bench.serial.take_lines().is_empty());
}

#[test]
fn trigger_output_precedes_command_reply() {
    let mut bench = Bench::booted();
    bench.run_for(990);
    bench.serial.take_lines();

    bench.now = 1_000;
    let lines = bench.command("STATUS");
    assert_eq!(lines, [HEARTBEAT, "", "Received command: STATUS"]);
}

// ── Command intake ────────────────────────────────────────────

#[test]
fn one_command_per_tick() {
    let mut bench = Bench::booted();
    bench.serial.push_line("SERVER_ONLINE");
    bench.serial.push_line("CHIP_STATUS ldpc1 X ONLINE");

    bench.tick();
    assert!(bench.rig.is_server_online());
    assert!(!bench.rig.registry().get("ldpc1").unwrap().is_online());

    bench.tick();
    assert!(bench.rig.registry().get("ldpc1").unwrap().is_online());
    assert_eq!(bench.serial.unread(), 0);
}

#[test]
fn partial_line_waits_for_terminator() {
    let mut bench = Bench::booted();
    bench.serial.push_bytes(b"SERVER_");
    bench.tick();
    assert!(!bench.rig.is_server_online());
    bench.serial.push_bytes(b"ONLINE\r\n");
    bench.tick();
    assert!(bench.rig.is_server_online());
}

#[test]
fn reattached_host_starts_with_clean_line_buffer() {
    let mut bench = Bench::booted();
    bench.serial.push_bytes(b"SERVER_");
    bench.tick();

    bench.serial.connected = false;
    bench.tick();
    bench.serial.connected = true;
    bench.serial.push_bytes(b"OFFLINE\n");
    bench.tick();

    // The stale "SERVER_" prefix is gone, so only "OFFLINE" arrives.
    assert_eq!(
        bench.serial.take_lines(),
        [
            "",
            "Received command: OFFLINE",
            "Unknown command. Use 'TEST<id> <chipId>' to run a test or 'STATUS' to check chip status.",
        ]
    );
    assert!(bench.command("SERVER_ONLINE").is_empty());
    assert!(bench.rig.is_server_online());
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let mut bench = Bench::booted();
    assert!(bench.command("   SERVER_ONLINE \t").is_empty());
    assert!(bench.rig.is_server_online());
}

#[test]
fn unknown_command_gets_echo_and_hint() {
    let mut bench = Bench::booted();
    assert_eq!(
        bench.command("HELLO"),
        [
            "",
            "Received command: HELLO",
            "Unknown command. Use 'TEST<id> <chipId>' to run a test or 'STATUS' to check chip status.",
        ]
    );
}

#[test]
fn status_is_echoed_and_otherwise_ignored_by_default() {
    let mut bench = Bench::booted();
    assert_eq!(bench.command("STATUS"), ["", "Received command: STATUS"]);
}

#[test]
fn status_push_reports_chip_table() {
    let config = RigConfig {
        status_push: true,
        ..RigConfig::default()
    };
    let mut bench = Bench::with_config(config);
    bench.tick();
    bench.serial.take_lines();

    bench.command("CHIP_STATUS ldpc2 X ONLINE");
    assert_eq!(
        bench.command("STATUS"),
        [
            "",
            "Received command: STATUS",
            concat!(
                r#"{"type":"chip_status","chips":["#,
                r#"{"id":"ldpc1","status":"offline"},"#,
                r#"{"id":"ldpc2","status":"online"},"#,
                r#"{"id":"ldpc3","status":"offline"}]}"#
            ),
        ]
    );
}

#[test]
fn invalid_test_ids_start_nothing() {
    let mut bench = Bench::booted();
    for line in ["TEST0 ldpc1", "TESTabc ldpc1", "TEST-4 ldpc1"] {
        let lines = bench.command(line);
        assert_eq!(
            lines,
            [
                String::new(),
                format!("Received command: {line}"),
                "Invalid test ID".to_owned(),
            ]
        );
        assert!(!bench.rig.is_testing());
    }
}

#[test]
fn test_without_chip_is_malformed() {
    let mut bench = Bench::booted();
    assert_eq!(
        bench.command("TEST5"),
        ["", "Received command: TEST5", "Invalid TEST command format"]
    );
    assert!(!bench.rig.is_testing());
}

// ── Chip status ───────────────────────────────────────────────

#[test]
fn chip_status_round_trip_is_silent() {
    let mut bench = Bench::booted();

    assert!(bench.command("CHIP_STATUS ldpc1 X ONLINE").is_empty());
    assert!(bench.rig.registry().get("ldpc1").unwrap().is_online());
    assert!(bench.chip_pin("ldpc1").high);

    assert!(bench.command("CHIP_STATUS ldpc1 X OFFLINE").is_empty());
    assert!(!bench.rig.registry().get("ldpc1").unwrap().is_online());
    assert!(!bench.chip_pin("ldpc1").high);

    // Other chips never touched after boot.
    assert_eq!(bench.chip_pin("ldpc2").history, [false]);
    assert_eq!(bench.chip_pin("ldpc3").history, [false]);
}

#[test]
fn unknown_or_malformed_chip_status_changes_nothing() {
    let mut bench = Bench::booted();
    for line in [
        "CHIP_STATUS ldpc9 X ONLINE",
        "CHIP_STATUS",
        "CHIP_STATUSldpc1",
        "CHIP_STATUS  ldpc1 ONLINE",
    ] {
        assert!(bench.command(line).is_empty(), "{line}");
    }
    for chip in bench.rig.registry().iter() {
        assert!(!chip.is_online());
        assert_eq!(bench.chip_pin(chip.id()).history, [false]);
    }
}

#[test]
fn chip_status_keyword_prefix_still_addresses_chip() {
    let mut bench = Bench::booted();
    assert!(bench.command("CHIP_STATUSX ldpc1 ONLINE").is_empty());
    assert!(bench.rig.registry().get("ldpc1").unwrap().is_online());
    assert!(bench.chip_pin("ldpc1").high);
}

#[test]
fn chip_status_other_than_online_turns_chip_off() {
    let mut bench = Bench::booted();
    bench.command("CHIP_STATUS ldpc2 X ONLINE");
    assert!(bench.chip_pin("ldpc2").high);

    assert!(bench.command("CHIP_STATUS ldpc2 online").is_empty());
    assert!(!bench.rig.registry().get("ldpc2").unwrap().is_online());
    assert!(!bench.chip_pin("ldpc2").high);
}

#[test]
fn failed_pin_write_keeps_chip_offline() {
    let pins = [MockPin::default(), MockPin::broken(), MockPin::default()];
    let mut bench = Bench::with_pins(RigConfig::default(), pins);
    bench.tick();
    bench.serial.take_lines();

    bench.command("CHIP_STATUS ldpc2 X ONLINE");
    assert!(!bench.rig.registry().get("ldpc2").unwrap().is_online());
    assert!(!bench.chip_pin("ldpc2").high);
}

// ── Server link ───────────────────────────────────────────────

#[test]
fn server_link_drives_led() {
    let mut bench = Bench::booted();

    assert!(bench.command("SERVER_ONLINE").is_empty());
    assert!(bench.led_pin().high);

    assert!(bench.command("SERVER_OFFLINE").is_empty());
    assert!(!bench.led_pin().high);

    bench.command("SERVER_ONLINE");
    assert!(bench.rig.is_server_online());
    assert!(bench.led_pin().high);
}

#[test]
fn idle_loop_polls_at_loop_period() {
    let mut bench = Bench::booted();
    bench.run_for(995);
    assert_eq!(bench.rig.next_wake_in(bench.now), 5);
    assert_eq!(bench.rig.next_wake_in(bench.now - 500), 10);
}
