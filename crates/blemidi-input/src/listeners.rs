//! Listener registry with callback and channel sinks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::event::InputEvent;

pub type Listener = Arc<dyn Fn(&InputEvent) + Send + Sync>;

/// Handle returned when registering a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
pub(crate) enum Sink {
    Callback(Listener),
    Channel(Sender<InputEvent>),
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    entries: RwLock<Vec<(ListenerId, Sink)>>,
}

impl ListenerRegistry {
    pub fn add(&self, sink: Sink) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, sink));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Delivers `event` to every sink in registration order.
    ///
    /// Sinks are snapshotted first so listeners may register or remove
    /// listeners from inside their callback.
    pub fn dispatch(&self, event: &InputEvent) {
        let sinks: SmallVec<[(ListenerId, Sink); 4]> =
            self.entries.read().iter().cloned().collect();
        let mut closed: SmallVec<[ListenerId; 2]> = SmallVec::new();

        for (id, sink) in &sinks {
            match sink {
                Sink::Callback(listener) => listener(event),
                Sink::Channel(tx) => match tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(listener = ?id, "MIDI input channel full, dropping event");
                    }
                    Err(TrySendError::Disconnected(_)) => closed.push(*id),
                },
            }
        }

        if !closed.is_empty() {
            debug!(count = closed.len(), "pruning closed MIDI input channels");
            self.entries.write().retain(|(id, _)| !closed.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blemidi_codec::Timestamp;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn event(bytes: &[u8]) -> InputEvent {
        InputEvent {
            data: SmallVec::from_slice(bytes),
            device_timestamp: Timestamp::default(),
            received_at: Instant::now(),
        }
    }

    #[test]
    fn test_add_remove() {
        let registry = ListenerRegistry::default();
        let a = registry.add(Sink::Callback(Arc::new(|_: &InputEvent| {})));
        let b = registry.add(Sink::Callback(Arc::new(|_: &InputEvent| {})));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dispatch_to_callbacks() {
        let registry = ListenerRegistry::default();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            registry.add(Sink::Callback(Arc::new(move |_: &InputEvent| {
                hits.fetch_add(1, Ordering::SeqCst);
            })));
        }
        registry.dispatch(&event(&[0xF8]));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_full_channel_drops_event() {
        let registry = ListenerRegistry::default();
        let (tx, rx) = crossbeam_channel::bounded(1);
        registry.add(Sink::Channel(tx));

        registry.dispatch(&event(&[0xF8]));
        registry.dispatch(&event(&[0xFA]));

        assert_eq!(rx.try_recv().unwrap().data.as_slice(), &[0xF8]);
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_closed_channel_pruned() {
        let registry = ListenerRegistry::default();
        let (tx, rx) = crossbeam_channel::bounded(4);
        registry.add(Sink::Channel(tx));
        drop(rx);

        registry.dispatch(&event(&[0xF8]));
        assert_eq!(registry.len(), 0);
    }
}
