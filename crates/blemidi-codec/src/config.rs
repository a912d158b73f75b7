//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// What `push` does with a malformed packet.
///
/// Either way the packet's remaining messages are lost and the decoder stays
/// usable for the next packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log a warning and report success.
    Discard,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub error_policy: ErrorPolicy,
    /// Upper bound on a complete SysEx message, `0xF0` and `0xF7` included.
    pub max_sysex_len: Option<usize>,
}
