//! Callback routing for remote:bit frames.
//!
//! This is the "just works" layer. Register handlers per component and id,
//! start the service on a radio, and send values or raw bytes to the peer.

pub mod error;
pub mod router;
pub mod service;

pub use error::{RemoteBitError, Result};
pub use router::{BufferHandler, Dispatch, DropReason, HandlerKey, Router, ValuesHandler};
pub use service::RemoteBit;
