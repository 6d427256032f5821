use std::path::PathBuf;

/// Errors that can occur in radio link operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// Transmit power level outside `0..=7`.
    #[error("transmit power {0} out of range (0-7)")]
    InvalidPower(u8),

    /// The service has not been started yet.
    #[error("radio service not started")]
    NotStarted,

    /// The service was already started.
    #[error("radio service already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, TransportError>;
