//! Inbound commands from the host.
//!
//! One newline-terminated line of text becomes at most one [`HostCommand`].
//! The grammar is case-sensitive and whitespace-tokenised:
//!
//! | Line                                   | Command                 |
//! |----------------------------------------|-------------------------|
//! | `CHIP_STATUS… <chip> … ONLINE\|…`     | [`HostCommand::SetChipStatus`] |
//! | `SERVER_ONLINE` / `SERVER_OFFLINE`     | link state transition   |
//! | `TEST<id> <chip> [args…]`              | [`HostCommand::RunTest`] |
//! | `STATUS`                               | [`HostCommand::QueryStatus`] |
//! | anything else                          | [`HostCommand::Unrecognized`] |
//!
//! Rules are tried top to bottom; the first match wins.

use core::fmt;

const CHIP_STATUS: &str = "CHIP_STATUS";
const SERVER_ONLINE: &str = "SERVER_ONLINE";
const SERVER_OFFLINE: &str = "SERVER_OFFLINE";
const TEST: &str = "TEST";
const STATUS: &str = "STATUS";
const ONLINE: &str = "ONLINE";

/// Commands the host can send to the rig.  Borrows from the received line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand<'a> {
    /// Start diagnostic run `test_id` against `chip_id`.
    ///
    /// `args` holds any trailing tokens (the host tool appends the SNR
    /// range and batch size); they are logged but not interpreted.
    RunTest {
        test_id: u32,
        chip_id: &'a str,
        args: &'a str,
    },

    /// Reserved status query.
    QueryStatus,

    /// Mark a chip online or offline.
    SetChipStatus { chip_id: &'a str, online: bool },

    /// The host declares itself online.
    ServerOnline,

    /// The host declares itself offline.
    ServerOffline,

    /// Anything the grammar does not recognise, verbatim.
    Unrecognized(&'a str),
}

/// Lines that look like a known command but do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// `TEST<id> …` where `<id>` is zero, negative, or not a number.
    InvalidTestId,
    /// `TEST…` without the space separating id and chip.
    MalformedTest,
    /// `CHIP_STATUS…` with the wrong shape.  Never reported to the host.
    MalformedChipStatus,
}

impl ParseError {
    /// Diagnostic line sent back to the host, or `None` if the error is
    /// dropped silently.
    pub fn reply(self) -> Option<&'static str> {
        match self {
            Self::InvalidTestId => Some("Invalid test ID"),
            Self::MalformedTest => Some("Invalid TEST command format"),
            Self::MalformedChipStatus => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTestId => write!(f, "invalid test id"),
            Self::MalformedTest => write!(f, "malformed TEST command"),
            Self::MalformedChipStatus => write!(f, "malformed CHIP_STATUS command"),
        }
    }
}

/// Parse one already-trimmed line.
pub fn parse(line: &str) -> Result<HostCommand<'_>, ParseError> {
    if line.starts_with(CHIP_STATUS) {
        return parse_chip_status(line);
    }
    match line {
        SERVER_ONLINE => return Ok(HostCommand::ServerOnline),
        SERVER_OFFLINE => return Ok(HostCommand::ServerOffline),
        _ => {}
    }
    if let Some(rest) = line.strip_prefix(TEST) {
        return parse_test(rest);
    }
    if line == STATUS {
        return Ok(HostCommand::QueryStatus);
    }
    Ok(HostCommand::Unrecognized(line))
}

/// `<id> <chip> [args…]`, i.e. everything after the `TEST` keyword.
fn parse_test(rest: &str) -> Result<HostCommand<'_>, ParseError> {
    let (id_text, tail) = rest.split_once(' ').ok_or(ParseError::MalformedTest)?;

    let test_id = id_text
        .parse::<u32>()
        .ok()
        .filter(|&id| id > 0)
        .ok_or(ParseError::InvalidTestId)?;

    let tail = tail.trim_start();
    let chip_id = tail
        .split_whitespace()
        .next()
        .ok_or(ParseError::MalformedTest)?;
    let args = tail[chip_id.len()..].trim();

    Ok(HostCommand::RunTest {
        test_id,
        chip_id,
        args,
    })
}

/// `CHIP_STATUS… <chip> [… ] <state>`.
///
/// Fields are separated by single spaces.  The chip is the field after the
/// first space, the state is the field after the last space.  Only a state
/// of exactly `ONLINE` means online; any other value means offline.  The
/// keyword itself is matched as a prefix, so `CHIP_STATUSX ldpc1 ONLINE`
/// still addresses `ldpc1`.
fn parse_chip_status(line: &str) -> Result<HostCommand<'_>, ParseError> {
    let (_, rest) = line.split_once(' ').ok_or(ParseError::MalformedChipStatus)?;
    let chip_id = rest.split(' ').next().unwrap_or(rest);
    let online = line.rsplit(' ').next() == Some(ONLINE);
    Ok(HostCommand::SetChipStatus { chip_id, online })
}
