//! BLE-MIDI input device.
//!
//! Wraps one [`StreamDecoder`] per connection. The transport layer calls
//! [`BleMidiInput::handle_notification`] for every characteristic
//! notification, in delivery order, and decoded messages are fanned out to
//! the registered listeners. Disconnecting is dropping the input: the
//! decoder and any half-received SysEx go with it.

use std::sync::Arc;
use std::time::Instant;

use blemidi_codec::{BleMidiMessage, DecoderConfig, ErrorPolicy, StreamDecoder};
use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::event::InputEvent;
use crate::listeners::{ListenerId, ListenerRegistry, Sink};

type DecoderCallback = Box<dyn FnMut(&BleMidiMessage<'_>) + Send>;

pub struct BleMidiInput {
    id: String,
    decoder: Mutex<StreamDecoder<DecoderCallback>>,
    listeners: Arc<ListenerRegistry>,
}

impl BleMidiInput {
    /// Malformed packets are logged and dropped; the stream keeps going.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(
            id,
            DecoderConfig {
                error_policy: ErrorPolicy::Discard,
                ..Default::default()
            },
        )
    }

    pub fn with_config(id: impl Into<String>, config: DecoderConfig) -> Self {
        let id = id.into();
        let listeners = Arc::new(ListenerRegistry::default());

        let registry = Arc::clone(&listeners);
        let callback: DecoderCallback = Box::new(move |msg: &BleMidiMessage<'_>| {
            registry.dispatch(&InputEvent::from_message(msg, Instant::now()));
        });

        debug!(device = %id, "BLE-MIDI input opened");

        Self {
            id,
            decoder: Mutex::new(StreamDecoder::with_config(config, callback)),
            listeners,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Decode one notification payload.
    ///
    /// Listeners run synchronously on the calling thread and must not call
    /// back into `handle_notification` on the same input.
    pub fn handle_notification(&self, packet: &[u8]) -> Result<()> {
        self.decoder.lock().push(packet)?;
        Ok(())
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&InputEvent) + Send + Sync + 'static,
    {
        self.listeners.add(Sink::Callback(Arc::new(listener)))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Channel receiving every decoded event.
    ///
    /// Events are dropped while the channel is full. The subscription ends
    /// when the receiver is dropped.
    pub fn subscribe(&self, capacity: usize) -> Receiver<InputEvent> {
        let (tx, rx) = bounded(capacity);
        self.listeners.add(Sink::Channel(tx));
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_awaiting_sysex(&self) -> bool {
        self.decoder.lock().is_awaiting_sysex()
    }
}

impl Drop for BleMidiInput {
    fn drop(&mut self) {
        debug!(device = %self.id, "BLE-MIDI input closed");
    }
}

impl std::fmt::Debug for BleMidiInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleMidiInput")
            .field("id", &self.id)
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}
