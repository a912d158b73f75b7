//! Events delivered to input listeners.

use std::time::Instant;

use blemidi_codec::{BleMidiMessage, Timestamp};
use smallvec::SmallVec;

/// A decoded MIDI message as seen by input consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputEvent {
    /// One complete MIDI message.
    pub data: SmallVec<[u8; 3]>,
    /// The device's 13-bit rolling timestamp.
    pub device_timestamp: Timestamp,
    /// Host time at which the notification was decoded.
    pub received_at: Instant,
}

impl InputEvent {
    pub(crate) fn from_message(msg: &BleMidiMessage<'_>, received_at: Instant) -> Self {
        Self {
            data: SmallVec::from_slice(msg.bytes()),
            device_timestamp: msg.timestamp(),
            received_at,
        }
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data.first().copied().unwrap_or_default()
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.status() == blemidi_codec::SYSEX_START
    }
}
