use std::sync::Arc;

use bytes::BytesMut;
use remotebit_frame::{encode_buffer, encode_values, ComponentId};
use remotebit_transport::{Radio, TxPower};
use tracing::{debug, info, warn};

use crate::error::{RemoteBitError, Result};
use crate::router::Router;

/// The remote:bit service bound to one radio.
///
/// Owns the radio and shares its [`Router`] with the radio's frame handler.
/// Sends are fire-and-forget: link failures are logged, never returned.
pub struct RemoteBit<R> {
    radio: R,
    router: Arc<Router>,
    started: bool,
}

impl<R: Radio> RemoteBit<R> {
    /// Create a service with an empty router.
    pub fn new(radio: R) -> Self {
        Self::with_router(radio, Arc::new(Router::new()))
    }

    /// Create a service around an existing router.
    pub fn with_router(radio: R, router: Arc<Router>) -> Self {
        Self {
            radio,
            router,
            started: false,
        }
    }

    /// Start the radio service and route every incoming frame.
    ///
    /// The router is attached before the link comes up so that no early
    /// frame is missed.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RemoteBitError::AlreadyStarted);
        }

        let router = self.router.clone();
        self.radio.on_frame(Box::new(move |bytes| {
            let outcome = router.dispatch(bytes);
            debug!(len = bytes.len(), ?outcome, "frame received");
        }));
        self.radio.start_service()?;

        self.started = true;
        info!("remote:bit service started");
        Ok(())
    }

    /// Whether a peer is connected.
    pub fn is_connected(&self) -> bool {
        self.radio.is_connected()
    }

    /// Send 16-bit values to a component. Values above 65535 wrap.
    pub fn send_values(&mut self, component: impl Into<u8>, id: ComponentId, values: &[u32]) {
        let mut buf = BytesMut::new();
        encode_values(component.into(), id.into(), values, &mut buf);
        self.transmit(&buf);
    }

    /// Send raw bytes to a component.
    pub fn send_buffer_from_array(
        &mut self,
        component: impl Into<u8>,
        id: ComponentId,
        bytes: &[u8],
    ) {
        let mut buf = BytesMut::new();
        encode_buffer(component.into(), id.into(), bytes, &mut buf);
        self.transmit(&buf);
    }

    /// Set the values handler for a component and id.
    pub fn on_received_values<F>(&self, component: impl Into<u8>, id: ComponentId, handler: F)
    where
        F: Fn(&[u16]) + Send + Sync + 'static,
    {
        self.router.on_received_values(component, id, handler);
    }

    /// Set the buffer handler for a component and id.
    pub fn on_received_buffer<F>(&self, component: impl Into<u8>, id: ComponentId, handler: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.router.on_received_buffer(component, id, handler);
    }

    /// Set transmit power between 0 (minimal) and 7 (maximum).
    ///
    /// Levels outside that range are rejected and logged.
    pub fn set_transmit_power(&mut self, level: u8) {
        let result = TxPower::new(level).and_then(|power| self.radio.set_transmit_power(power));
        if let Err(err) = result {
            warn!(level, error = %err, "transmit power not applied");
        }
    }

    /// The shared handler tables.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Borrow the radio.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutably borrow the radio.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn transmit(&mut self, frame: &[u8]) {
        if let Err(err) = self.radio.write_buffer(frame) {
            warn!(len = frame.len(), error = %err, "frame write failed; dropped");
        }
    }
}
