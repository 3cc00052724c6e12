//! Outbound messages to the host.
//!
//! Every message is one self-contained JSON object on its own line.  Most
//! carry a `type` tag; test progress records are untagged because the host
//! tool predates the tag and matches them by shape.
//!
//! | Variant         | Wire form                                             |
//! |-----------------|-------------------------------------------------------|
//! | `Heartbeat`     | `{"type":"heartbeat"}`                                |
//! | `StatusCheck`   | `{"type":"status_check"}`                             |
//! | `TestStarted`   | `{"type":"test_started","content":"3 ldpc1"}`         |
//! | `TestProgress`  | `{"testId":3,"chipId":"ldpc1","count":1}`             |
//! | `TestCompleted` | `{"type":"test_completed","testId":3,"chipId":"ldpc1"}` |
//! | `ChipStatus`    | `{"type":"chip_status","chips":[{"id":…,"status":"online"}]}` |

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::registry::ChipState;

/// Structured records emitted by the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMessage<'a> {
    /// Periodic liveness beacon.
    Heartbeat,

    /// Periodic request for the host to re-announce its link state.
    StatusCheck,

    /// A diagnostic run has begun.
    TestStarted { test_id: u32, chip_id: &'a str },

    /// One progress step of a running diagnostic (`count` is 1-based).
    TestProgress {
        test_id: u32,
        chip_id: &'a str,
        count: u8,
    },

    /// A diagnostic run has finished.
    TestCompleted { test_id: u32, chip_id: &'a str },

    /// Online/offline state of every chip, in registry order.
    ChipStatus(&'a [ChipState]),
}

impl HostMessage<'_> {
    /// The `type` tag, or `None` for untagged records.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            Self::Heartbeat => Some("heartbeat"),
            Self::StatusCheck => Some("status_check"),
            Self::TestStarted { .. } => Some("test_started"),
            Self::TestProgress { .. } => None,
            Self::TestCompleted { .. } => Some("test_completed"),
            Self::ChipStatus(_) => Some("chip_status"),
        }
    }
}

impl Serialize for HostMessage<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(tag) = self.type_tag() {
            map.serialize_entry("type", tag)?;
        }
        match self {
            Self::Heartbeat | Self::StatusCheck => {}
            Self::TestStarted { test_id, chip_id } => {
                map.serialize_entry("content", &format_args!("{test_id} {chip_id}"))?;
            }
            Self::TestProgress {
                test_id,
                chip_id,
                count,
            } => {
                map.serialize_entry("testId", test_id)?;
                map.serialize_entry("chipId", chip_id)?;
                map.serialize_entry("count", count)?;
            }
            Self::TestCompleted { test_id, chip_id } => {
                map.serialize_entry("testId", test_id)?;
                map.serialize_entry("chipId", chip_id)?;
            }
            Self::ChipStatus(chips) => {
                map.serialize_entry("chips", chips)?;
            }
        }
        map.end()
    }
}
