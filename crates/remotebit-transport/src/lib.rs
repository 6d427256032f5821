//! Radio link abstraction for the remote:bit peer-messaging service.
//!
//! On a micro:bit the link is a BLE service with one RX and one TX
//! characteristic, implemented in firmware. This crate models that native
//! layer as the [`Radio`] capability so the frame router above it can run
//! against any implementation:
//! - [`LoopbackRadio`] - in-process test double
//! - [`UdsRadio`] - Unix domain socket link for host-side tooling
//!
//! This is the lowest layer of remotebit. Everything else builds on top of
//! the [`Radio`] trait provided here.

pub mod error;
pub mod loopback;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use loopback::{LoopbackPeer, LoopbackRadio};
pub use traits::{Radio, RadioConfig, RxHandler, TxPower, MAX_FRAME_LEN};

#[cfg(unix)]
pub use uds::UdsRadio;
