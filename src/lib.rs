//! # blemidi - BLE-MIDI decoding
//!
//! Turns Bluetooth LE MIDI notification packets into complete, timestamped
//! MIDI messages.
//!
//! ## Architecture
//!
//! blemidi is an umbrella crate that coordinates:
//! - **blemidi-codec** - Packet cursor, parser state machine, stream decoder
//! - **blemidi-input** - Per-device input with listener and channel fan-out
//!
//! ## Quick Start
//!
//! ```
//! use blemidi::prelude::*;
//!
//! let input = BleMidiInput::new("keyboard");
//! let events = input.subscribe(64);
//!
//! // Called from the BLE notification handler
//! input.handle_notification(&[0x80, 0x80, 0x90, 0x3C, 0x64])?;
//!
//! let event = events.try_recv().unwrap();
//! assert_eq!(event.data.as_slice(), &[0x90, 0x3C, 0x64]);
//! # Ok::<(), blemidi::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Codec and input devices
//! - `input` - [`BleMidiInput`](input::BleMidiInput)

/// Re-export of blemidi-codec for direct access
pub use blemidi_codec as codec;

pub use blemidi_codec::{
    BleMidiMessage, DecoderConfig, ErrorPolicy, MidiMsg, OwnedBleMidiMessage, StreamDecoder,
    StreamDecoderBuilder, SysExContext, Timestamp,
};

#[cfg(feature = "input")]
pub use blemidi_input as input;

pub mod error;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use blemidi_codec::{
        BleMidiMessage, DecoderConfig, ErrorPolicy, OwnedBleMidiMessage, StreamDecoder, Timestamp,
    };

    #[cfg(feature = "input")]
    pub use blemidi_input::{BleMidiInput, InputEvent, ListenerId};
}
