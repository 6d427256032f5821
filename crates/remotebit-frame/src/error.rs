/// Errors raised while building or parsing frame fields.
///
/// Decoding received frames never fails; malformed frames are dropped by
/// the router instead.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// Component id outside `0..=15`.
    #[error("component id {0} out of range (0-15)")]
    InvalidId(u8),

    /// Component name or number not recognised.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Malformed hex input.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
