use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use remotebit_frame::{ComponentId, Frame};
use tracing::trace;

/// Handler for decoded 16-bit values.
pub type ValuesHandler = Arc<dyn Fn(&[u16]) + Send + Sync>;

/// Handler for raw payload bytes.
pub type BufferHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Routing identity of a (component, id) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerKey {
    pub component: u8,
    pub id: u8,
}

impl HandlerKey {
    pub fn new(component: u8, id: u8) -> Self {
        Self { component, id }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.component, self.id)
    }
}

/// Why a frame reached no handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Fewer than two bytes: no component or id to route on.
    TooShort,
    /// No handler registered for the frame's key.
    Unhandled,
}

/// Outcome of routing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Dropped(DropReason),
    Delivered { values: bool, buffer: bool },
}

/// Two handler tables keyed by [`HandlerKey`].
///
/// A key may hold one values handler and one buffer handler at the same
/// time; a frame for that key fires both. Registration overwrites and there
/// is no removal.
#[derive(Default)]
pub struct Router {
    values: Mutex<HashMap<HandlerKey, ValuesHandler>>,
    buffers: Mutex<HashMap<HandlerKey, BufferHandler>>,
    // Serialises dispatch; handlers never run concurrently.
    gate: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values handler for a key, replacing any previous one.
    pub fn on_received_values<F>(&self, component: impl Into<u8>, id: ComponentId, handler: F)
    where
        F: Fn(&[u16]) + Send + Sync + 'static,
    {
        let key = HandlerKey::new(component.into(), id.into());
        trace!(%key, "values handler registered");
        lock(&self.values).insert(key, Arc::new(handler));
    }

    /// Set the buffer handler for a key, replacing any previous one.
    pub fn on_received_buffer<F>(&self, component: impl Into<u8>, id: ComponentId, handler: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let key = HandlerKey::new(component.into(), id.into());
        trace!(%key, "buffer handler registered");
        lock(&self.buffers).insert(key, Arc::new(handler));
    }

    /// Whether any handler is registered for `key`.
    pub fn is_registered(&self, key: HandlerKey) -> bool {
        lock(&self.values).contains_key(&key) || lock(&self.buffers).contains_key(&key)
    }

    /// Route one received frame.
    ///
    /// The values handler runs first with the whole payload decoded; the
    /// buffer handler then gets [`Frame::truncated_buffer`]. Handlers run
    /// with the tables unlocked, so they may register further handlers, but
    /// they must not call `dispatch` themselves.
    pub fn dispatch(&self, bytes: &[u8]) -> Dispatch {
        let _gate = lock(&self.gate);

        let Some(frame) = Frame::parse(bytes) else {
            trace!(len = bytes.len(), "frame shorter than header; dropped");
            return Dispatch::Dropped(DropReason::TooShort);
        };

        let key = HandlerKey::new(frame.component, frame.id);
        let values = lock(&self.values).get(&key).cloned();
        let buffer = lock(&self.buffers).get(&key).cloned();

        if values.is_none() && buffer.is_none() {
            trace!(%key, "no handler; frame dropped");
            return Dispatch::Dropped(DropReason::Unhandled);
        }

        if let Some(handler) = &values {
            handler(&frame.values());
        }
        if let Some(handler) = &buffer {
            handler(&frame.truncated_buffer());
        }

        Dispatch::Delivered {
            values: values.is_some(),
            buffer: buffer.is_some(),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("values", &lock(&self.values).len())
            .field("buffers", &lock(&self.buffers).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use remotebit_frame::{ReceivedComponent, BUTTON, JOYSTICK};

    use super::*;

    fn id(n: u8) -> ComponentId {
        ComponentId::try_from(n).unwrap()
    }

    #[test]
    fn short_frames_are_dropped() {
        let router = Router::new();
        let (tx, rx) = mpsc::channel();
        router.on_received_values(BUTTON, id(0), move |values| {
            let _ = tx.send(values.to_vec());
        });

        assert_eq!(router.dispatch(&[100]), Dispatch::Dropped(DropReason::TooShort));
        assert_eq!(router.dispatch(&[]), Dispatch::Dropped(DropReason::TooShort));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unregistered_key_is_dropped() {
        let router = Router::new();
        router.on_received_values(BUTTON, id(1), |_| {});
        assert_eq!(
            router.dispatch(&[BUTTON, 2, 1, 0]),
            Dispatch::Dropped(DropReason::Unhandled)
        );
        assert_eq!(
            router.dispatch(&[JOYSTICK, 1, 1, 0]),
            Dispatch::Dropped(DropReason::Unhandled)
        );
    }

    #[test]
    fn both_handlers_fire_once_per_frame() {
        let router = Router::new();
        let (values_tx, values_rx) = mpsc::channel();
        let (buffer_tx, buffer_rx) = mpsc::channel();
        router.on_received_values(ReceivedComponent::Joystick, id(4), move |values| {
            let _ = values_tx.send(values.to_vec());
        });
        router.on_received_buffer(ReceivedComponent::Joystick, id(4), move |bytes| {
            let _ = buffer_tx.send(bytes.to_vec());
        });

        let outcome = router.dispatch(&[101, 4, 0x2c, 0x01, 0xff, 0xff, 0x07]);
        assert_eq!(
            outcome,
            Dispatch::Delivered {
                values: true,
                buffer: true
            }
        );

        assert_eq!(values_rx.try_recv().unwrap(), vec![300, 65535, 7]);
        assert!(values_rx.try_recv().is_err());
        assert_eq!(buffer_rx.try_recv().unwrap(), vec![0x2c, 0x01, 0xff]);
        assert!(buffer_rx.try_recv().is_err());
    }

    #[test]
    fn buffer_only_registration() {
        let router = Router::new();
        let (tx, rx) = mpsc::channel();
        router.on_received_buffer(BUTTON, id(0), move |bytes| {
            let _ = tx.send(bytes.to_vec());
        });

        let outcome = router.dispatch(&[100, 0, 1, 2]);
        assert_eq!(
            outcome,
            Dispatch::Delivered {
                values: false,
                buffer: true
            }
        );
        assert!(rx.try_recv().unwrap().is_empty());
    }

    #[test]
    fn re_registration_replaces_handler() {
        let router = Router::new();
        let (old_tx, old_rx) = mpsc::channel();
        let (new_tx, new_rx) = mpsc::channel();
        router.on_received_values(BUTTON, id(7), move |values| {
            let _ = old_tx.send(values.to_vec());
        });
        router.on_received_values(BUTTON, id(7), move |values| {
            let _ = new_tx.send(values.to_vec());
        });

        router.dispatch(&[100, 7, 1, 0]);
        router.dispatch(&[100, 7, 2, 0]);

        assert!(old_rx.try_recv().is_err());
        assert_eq!(new_rx.try_iter().collect::<Vec<_>>(), vec![vec![1], vec![2]]);
    }

    #[test]
    fn handler_may_register_during_dispatch() {
        let router = Arc::new(Router::new());
        let inner = router.clone();
        router.on_received_values(BUTTON, id(0), move |_| {
            inner.on_received_buffer(BUTTON, id(1), |_| {});
        });

        router.dispatch(&[100, 0]);
        assert!(router.is_registered(HandlerKey::new(100, 1)));
    }

    #[test]
    fn every_key_routes_its_own_values() {
        use bytes::BytesMut;
        use remotebit_frame::encode_values;

        let router = Router::new();
        let (tx, rx) = mpsc::channel();
        for component in 0..=u8::MAX {
            for n in ComponentId::all() {
                let tx = tx.clone();
                router.on_received_values(component, n, move |values| {
                    let _ = tx.send((component, u8::from(n), values.to_vec()));
                });
            }
        }

        let values = [0u32, 255, 256, 65535];
        for component in 0..=u8::MAX {
            for n in 0..=15u8 {
                let mut buf = BytesMut::new();
                encode_values(component, n, &values, &mut buf);
                assert_eq!(
                    router.dispatch(&buf),
                    Dispatch::Delivered {
                        values: true,
                        buffer: false
                    }
                );
                assert_eq!(
                    rx.try_recv().unwrap(),
                    (component, n, vec![0, 255, 256, 65535])
                );
            }
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn key_display() {
        assert_eq!(HandlerKey::new(101, 15).to_string(), "101/15");
    }
}
