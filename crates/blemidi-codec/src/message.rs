//! Decoded MIDI messages.
//!
//! [`BleMidiMessage`] is the zero-copy view handed to the decoder callback.
//! It borrows either the packet or the decoder's SysEx buffer, so it only
//! lives for the duration of the callback. Call [`BleMidiMessage::to_owned_message`]
//! to keep it.

use midi_msg::MidiMsg;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MessageBytes<'a> {
    Borrowed(&'a [u8]),
    /// Running-status message rebuilt from the remembered status byte.
    Inline { buf: [u8; 3], len: u8 },
}

/// One complete MIDI message decoded from a BLE-MIDI stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BleMidiMessage<'a> {
    timestamp: Timestamp,
    bytes: MessageBytes<'a>,
}

impl<'a> BleMidiMessage<'a> {
    #[inline]
    pub(crate) fn borrowed(timestamp: Timestamp, bytes: &'a [u8]) -> Self {
        Self {
            timestamp,
            bytes: MessageBytes::Borrowed(bytes),
        }
    }

    /// Prepends `status` to running-status data bytes.
    #[inline]
    pub(crate) fn with_status(timestamp: Timestamp, status: u8, data: &[u8]) -> Self {
        let mut buf = [status, 0, 0];
        let len = data.len().min(2);
        buf[1..1 + len].copy_from_slice(&data[..len]);
        Self {
            timestamp,
            bytes: MessageBytes::Inline {
                buf,
                len: len as u8 + 1,
            },
        }
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        match &self.bytes {
            MessageBytes::Borrowed(bytes) => bytes,
            MessageBytes::Inline { buf, len } => &buf[..*len as usize],
        }
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.bytes().first().copied().unwrap_or_default()
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.status() == SYSEX_START
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.status() >= 0xF8
    }

    /// Channel (0-15) for channel messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        let status = self.status();
        (0x80..0xF0).contains(&status).then_some(status & 0x0F)
    }

    pub fn to_owned_message(&self) -> OwnedBleMidiMessage {
        OwnedBleMidiMessage {
            timestamp: self.timestamp,
            bytes: SmallVec::from_slice(self.bytes()),
        }
    }

    /// Typed representation for downstream routing.
    pub fn to_midi_msg(&self) -> Result<MidiMsg> {
        parse_midi_msg(self.bytes())
    }
}

/// Owned copy of a decoded message. Non-SysEx messages stay inline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedBleMidiMessage {
    pub timestamp: Timestamp,
    pub bytes: SmallVec<[u8; 3]>,
}

impl OwnedBleMidiMessage {
    pub fn new(timestamp: Timestamp, bytes: &[u8]) -> Self {
        Self {
            timestamp,
            bytes: SmallVec::from_slice(bytes),
        }
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.bytes.first() == Some(&SYSEX_START)
    }

    pub fn to_midi_msg(&self) -> Result<MidiMsg> {
        parse_midi_msg(&self.bytes)
    }
}

impl From<&BleMidiMessage<'_>> for OwnedBleMidiMessage {
    fn from(msg: &BleMidiMessage<'_>) -> Self {
        msg.to_owned_message()
    }
}

fn parse_midi_msg(bytes: &[u8]) -> Result<MidiMsg> {
    let (msg, consumed) = MidiMsg::from_midi(bytes)?;
    if consumed != bytes.len() {
        return Err(Error::MidiMsg(format!(
            "consumed {consumed} of {} bytes",
            bytes.len()
        )));
    }
    Ok(msg)
}
