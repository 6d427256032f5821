use std::fmt;
use std::time::Duration;

use crate::error::{Result, TransportError};

/// Size of the native RX/TX characteristic buffers.
///
/// Writes longer than this are truncated by the link.
pub const MAX_FRAME_LEN: usize = 20;

/// Sink for "frame arrived" notifications.
///
/// Receives exactly the bytes of one incoming write. Never called with an
/// empty slice.
pub type RxHandler = Box<dyn FnMut(&[u8]) + Send>;

/// Radio transmit power, from 0 (minimal) to 7 (maximum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxPower(u8);

impl TxPower {
    pub const MIN: TxPower = TxPower(0);
    pub const MAX: TxPower = TxPower(7);

    /// Validate a raw power level.
    pub fn new(level: u8) -> Result<Self> {
        if level > Self::MAX.0 {
            return Err(TransportError::InvalidPower(level));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for TxPower {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for TxPower {
    type Error = TransportError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for TxPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Link behavior knobs shared by radio implementations.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// Longest frame the link carries. Default: [`MAX_FRAME_LEN`].
    pub max_frame_len: usize,
    /// How long a central waits for the peripheral to accept.
    pub connect_timeout: Duration,
    /// Write timeout for blocking link writes.
    pub write_timeout: Option<Duration>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
            connect_timeout: Duration::from_secs(5),
            write_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// The native peer-messaging capability the router depends on.
///
/// Implementations carry the firmware's link semantics:
/// - writes while no peer is connected are dropped and still return `Ok`
/// - frames longer than the configured maximum are truncated
/// - zero-length incoming writes never reach the handler
/// - handler invocations are serial, never two at once
pub trait Radio {
    /// Bring the link up. Must be called once before any send or receive.
    fn start_service(&mut self) -> Result<()>;

    /// Whether a peer is currently connected.
    fn is_connected(&self) -> bool;

    /// Adjust transmit power.
    fn set_transmit_power(&mut self, power: TxPower) -> Result<()>;

    /// Hand a frame to the link for transmission. No delivery confirmation.
    fn write_buffer(&mut self, frame: &[u8]) -> Result<()>;

    /// Register the frame-arrived handler, replacing any previous one.
    fn on_frame(&mut self, handler: RxHandler);
}

impl<R: Radio + ?Sized> Radio for Box<R> {
    fn start_service(&mut self) -> Result<()> {
        (**self).start_service()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn set_transmit_power(&mut self, power: TxPower) -> Result<()> {
        (**self).set_transmit_power(power)
    }

    fn write_buffer(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write_buffer(frame)
    }

    fn on_frame(&mut self, handler: RxHandler) {
        (**self).on_frame(handler)
    }
}

/// Clip a frame to the link's maximum length.
pub(crate) fn clip(frame: &[u8], max: usize) -> &[u8] {
    &frame[..frame.len().min(max)]
}
