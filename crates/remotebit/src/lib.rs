//! remote:bit peer messaging for micro:bit style radio links.
//!
//! A remote peer (phone, gamepad, another board) exchanges tiny frames with
//! the device: a component tag, an id and a payload of 16-bit values or raw
//! bytes. Received frames are routed to handlers registered per component
//! and id.
//!
//! # Crate Structure
//!
//! - [`transport`] - Radio capability trait, loopback and Unix socket links
//! - [`frame`] - Frame codec and component vocabulary
//! - [`router`] - Handler tables and the [`RemoteBit`] service
//!
//! ```
//! use remotebit::frame::{ComponentId, ReceivedComponent, SendComponent};
//! use remotebit::transport::LoopbackRadio;
//! use remotebit::RemoteBit;
//!
//! let (radio, peer) = LoopbackRadio::pair();
//! let mut remote = RemoteBit::new(radio);
//! let id = ComponentId::try_from(0).unwrap();
//!
//! remote.on_received_values(ReceivedComponent::Button, id, |values| {
//!     assert_eq!(values, &[1]);
//! });
//! remote.start().unwrap();
//! peer.connect();
//!
//! peer.deliver(&[100, 0, 1, 0]);
//! remote.send_values(SendComponent::Speed, id, &[300]);
//! assert_eq!(peer.sent(), vec![vec![100, 0, 0x2c, 0x01]]);
//! ```

/// Re-export transport types.
pub mod transport {
    pub use remotebit_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use remotebit_frame::*;
}

/// Re-export router types.
pub mod router {
    pub use remotebit_router::*;
}

pub use remotebit_router::{RemoteBit, RemoteBitError, Router};
