//! Error types for the BLE-MIDI codec.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid header byte {0:#04x}: top bits must be 10")]
    InvalidHeader(u8),

    #[error("Invalid timestamp byte {0:#04x}: top bit must be set")]
    InvalidTimestampByte(u8),

    #[error("Truncated message {status:#04x}: expected {expected} bytes, {available} available")]
    TruncatedMessage {
        status: u8,
        expected: usize,
        available: usize,
    },

    #[error("SysEx end (0xf7) without a matching SysEx start")]
    UnmatchedSysExEnd,

    #[error("Unexpected end of packet")]
    UnexpectedEndOfPacket,

    #[error("Unexpected byte {0:#04x}")]
    UnexpectedByte(u8),

    #[error("SysEx message exceeds {limit} bytes")]
    SysExOverflow { limit: usize },

    #[error("MIDI message conversion error: {0}")]
    MidiMsg(String),
}

impl From<midi_msg::ParseError> for Error {
    fn from(e: midi_msg::ParseError) -> Self {
        Error::MidiMsg(format!("{e:?}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
