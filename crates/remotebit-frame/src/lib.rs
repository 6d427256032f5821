//! remote:bit frame codec.
//!
//! Every radio write carries one frame:
//! - 1 byte component tag (logical channel, e.g. Speed or Button)
//! - 1 byte component id (0-15)
//! - payload: little-endian 16-bit values or raw bytes
//!
//! There is no length field and no checksum; the radio preserves write
//! boundaries.

pub mod codec;
pub mod component;
pub mod error;
pub mod hex;

pub use codec::{decode_values, encode_buffer, encode_values, Frame, HEADER_SIZE};
pub use component::{
    component_name, parse_component, ComponentId, ReceivedComponent, SendComponent, BUTTON,
    DISTANCE, JOYSTICK, SPEED,
};
pub use error::{FrameError, Result};
pub use self::hex::{from_hex, to_hex};
