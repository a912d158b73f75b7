//! BLE-MIDI packet decoder.
//!
//! Turns the packets delivered by a Bluetooth LE MIDI characteristic into
//! complete, timestamped MIDI messages. Handles running status, SysEx split
//! across any number of packets, interleaved real-time messages and the
//! 13-bit rolling timestamp.
//!
//! # Example
//!
//! ```
//! use blemidi_codec::{BleMidiMessage, StreamDecoder};
//!
//! let mut notes = Vec::new();
//! let mut decoder = StreamDecoder::new(|msg: &BleMidiMessage<'_>| {
//!     notes.push(msg.bytes().to_vec());
//! });
//!
//! // header, timestamp, Note On, running-status Note On
//! decoder.push(&[0x80, 0x80, 0x90, 0x40, 0x64, 0x41, 0x65])?;
//! drop(decoder);
//!
//! assert_eq!(notes, vec![vec![0x90, 0x40, 0x64], vec![0x90, 0x41, 0x65]]);
//! # Ok::<(), blemidi_codec::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{DecoderConfig, ErrorPolicy};

mod cursor;
pub use cursor::{channel_message_len, system_message_len, ByteCursor};

mod timestamp;
pub use timestamp::Timestamp;

mod message;
pub use message::{BleMidiMessage, OwnedBleMidiMessage, SYSEX_END, SYSEX_START};

pub(crate) mod state;

mod decoder;
pub use decoder::{StreamDecoder, StreamDecoderBuilder, SysExContext};

// Typed messages for downstream routing
pub use midi_msg::MidiMsg;
