use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::{clip, Radio, RadioConfig, RxHandler, TxPower};

/// In-process radio with a scriptable remote side.
///
/// The paired [`LoopbackPeer`] plays the phone or controller on the other
/// end of the link: it connects, pushes frames in and inspects what the
/// radio transmitted.
pub struct LoopbackRadio {
    shared: Arc<Shared>,
}

/// Remote end of a [`LoopbackRadio`]. Cheap to clone.
#[derive(Clone)]
pub struct LoopbackPeer {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<LinkState>,
    // Held for the whole handler call so deliveries never overlap.
    handler: Mutex<Option<RxHandler>>,
}

struct LinkState {
    config: RadioConfig,
    started: bool,
    connected: bool,
    power: TxPower,
    sent: Vec<Vec<u8>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoopbackRadio {
    /// Create a radio and its remote peer handle.
    pub fn pair() -> (Self, LoopbackPeer) {
        Self::pair_with_config(RadioConfig::default())
    }

    /// Create a radio with explicit link configuration.
    pub fn pair_with_config(config: RadioConfig) -> (Self, LoopbackPeer) {
        let shared = Arc::new(Shared {
            state: Mutex::new(LinkState {
                config,
                started: false,
                connected: false,
                power: TxPower::default(),
                sent: Vec::new(),
            }),
            handler: Mutex::new(None),
        });
        (
            Self {
                shared: shared.clone(),
            },
            LoopbackPeer { shared },
        )
    }
}

impl Radio for LoopbackRadio {
    fn start_service(&mut self) -> Result<()> {
        let mut state = lock(&self.shared.state);
        if state.started {
            return Err(TransportError::AlreadyStarted);
        }
        state.started = true;
        debug!("loopback radio started");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        lock(&self.shared.state).connected
    }

    fn set_transmit_power(&mut self, power: TxPower) -> Result<()> {
        lock(&self.shared.state).power = power;
        debug!(%power, "transmit power set");
        Ok(())
    }

    fn write_buffer(&mut self, frame: &[u8]) -> Result<()> {
        let mut state = lock(&self.shared.state);
        if !state.started {
            return Err(TransportError::NotStarted);
        }
        if !state.connected {
            trace!(len = frame.len(), "no peer connected; write dropped");
            return Ok(());
        }
        let frame = clip(frame, state.config.max_frame_len).to_vec();
        state.sent.push(frame);
        Ok(())
    }

    fn on_frame(&mut self, handler: RxHandler) {
        *lock(&self.shared.handler) = Some(handler);
    }
}

impl LoopbackPeer {
    /// Connect the remote side.
    pub fn connect(&self) {
        lock(&self.shared.state).connected = true;
    }

    /// Disconnect the remote side.
    pub fn disconnect(&self) {
        lock(&self.shared.state).connected = false;
    }

    /// Write a frame to the radio's RX side.
    ///
    /// Returns `true` when the frame reached the registered handler. Empty
    /// writes, writes before `start_service` and writes with no handler are
    /// dropped.
    pub fn deliver(&self, bytes: &[u8]) -> bool {
        let max = {
            let state = lock(&self.shared.state);
            if !state.started {
                trace!("radio not started; incoming write dropped");
                return false;
            }
            state.config.max_frame_len
        };
        if bytes.is_empty() {
            trace!("empty incoming write ignored");
            return false;
        }

        let mut handler = lock(&self.shared.handler);
        match handler.as_mut() {
            Some(handler) => {
                handler(clip(bytes, max));
                true
            }
            None => false,
        }
    }

    /// Frames the radio transmitted so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.shared.state).sent.clone()
    }

    /// Drain transmitted frames.
    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut lock(&self.shared.state).sent)
    }

    /// Last transmit power the radio applied.
    pub fn power(&self) -> TxPower {
        lock(&self.shared.state).power
    }

    /// Whether the radio's service has been started.
    pub fn is_started(&self) -> bool {
        lock(&self.shared.state).started
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::traits::MAX_FRAME_LEN;

    fn started() -> (LoopbackRadio, LoopbackPeer) {
        let (mut radio, peer) = LoopbackRadio::pair();
        radio.start_service().unwrap();
        (radio, peer)
    }

    #[test]
    fn write_before_start_is_rejected() {
        let (mut radio, _peer) = LoopbackRadio::pair();
        let err = radio.write_buffer(&[100, 0]).unwrap_err();
        assert!(matches!(err, TransportError::NotStarted));
    }

    #[test]
    fn second_start_is_rejected() {
        let (mut radio, peer) = started();
        assert!(peer.is_started());
        assert!(matches!(
            radio.start_service(),
            Err(TransportError::AlreadyStarted)
        ));
    }

    #[test]
    fn write_while_disconnected_is_dropped() {
        let (mut radio, peer) = started();
        radio.write_buffer(&[100, 0, 1, 0]).unwrap();
        assert!(peer.sent().is_empty());

        peer.connect();
        assert!(radio.is_connected());
        radio.write_buffer(&[100, 0, 1, 0]).unwrap();
        assert_eq!(peer.sent(), vec![vec![100, 0, 1, 0]]);
    }

    #[test]
    fn long_write_is_truncated() {
        let (mut radio, peer) = started();
        peer.connect();
        radio.write_buffer(&[7u8; 30]).unwrap();
        let sent = peer.take_sent();
        assert_eq!(sent[0].len(), MAX_FRAME_LEN);
        assert!(peer.sent().is_empty());
    }

    #[test]
    fn deliver_reaches_handler() {
        let (mut radio, peer) = started();
        let (tx, rx) = mpsc::channel();
        radio.on_frame(Box::new(move |bytes| {
            let _ = tx.send(bytes.to_vec());
        }));

        assert!(peer.deliver(&[101, 3, 9]));
        assert_eq!(rx.try_recv().unwrap(), vec![101, 3, 9]);
    }

    #[test]
    fn empty_and_unhandled_deliveries_are_dropped() {
        let (mut radio, peer) = started();
        assert!(!peer.deliver(&[100, 0]));

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        radio.on_frame(Box::new(move |bytes| {
            let _ = tx.send(bytes.to_vec());
        }));
        assert!(!peer.deliver(&[]));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn handler_registration_replaces_previous() {
        let (mut radio, peer) = started();
        let (first_tx, first_rx) = mpsc::channel::<()>();
        let (second_tx, second_rx) = mpsc::channel::<()>();
        radio.on_frame(Box::new(move |_| {
            let _ = first_tx.send(());
        }));
        radio.on_frame(Box::new(move |_| {
            let _ = second_tx.send(());
        }));

        peer.deliver(&[100, 1]);
        assert!(first_rx.try_recv().is_err());
        assert!(second_rx.try_recv().is_ok());
    }

    #[test]
    fn transmit_power_is_recorded() {
        let (mut radio, peer) = started();
        assert_eq!(peer.power(), TxPower::MAX);
        radio.set_transmit_power(TxPower::new(2).unwrap()).unwrap();
        assert_eq!(peer.power().level(), 2);
    }
}
