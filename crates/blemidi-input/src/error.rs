//! Error types for BLE-MIDI input devices.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("BLE-MIDI decode error: {0}")]
    Decode(#[from] blemidi_codec::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
