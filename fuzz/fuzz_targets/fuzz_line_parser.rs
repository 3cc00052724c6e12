//! Fuzz target: `LineDecoder` → `commands::parse`
//!
//! Feeds arbitrary bytes through the line decoder and parses every line it
//! yields.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Decoded lines never exceed `MAX_LINE_LEN` or contain `\n`
//! - A parsed `RunTest` has a positive id and a whitespace-free chip id
//!
//! cargo fuzz run fuzz_line_parser

#![no_main]

use chiprig::app::commands::{HostCommand, parse};
use chiprig::config::MAX_LINE_LEN;
use chiprig::protocol::line_codec::LineDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();
    for &byte in data {
        let Some(line) = decoder.feed(byte) else {
            continue;
        };
        assert!(line.len() <= MAX_LINE_LEN);
        assert!(!line.contains('\n'));

        if let Ok(HostCommand::RunTest { test_id, chip_id, .. }) = parse(line.trim()) {
            assert!(test_id > 0);
            assert!(!chip_id.is_empty());
            assert!(!chip_id.contains(char::is_whitespace));
        }
    }
    assert!(decoder.pending() <= MAX_LINE_LEN);
});
