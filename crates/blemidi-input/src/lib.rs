//! BLE-MIDI input devices.
//!
//! Connects a Bluetooth LE MIDI notification stream to MIDI consumers: one
//! [`BleMidiInput`] per connected device decodes packets and fans the
//! resulting messages out to callbacks and channels.

pub mod error;
pub use error::{Error, Result};

mod device;
pub use device::BleMidiInput;

mod event;
pub use event::InputEvent;

mod listeners;
pub use listeners::{Listener, ListenerId};
