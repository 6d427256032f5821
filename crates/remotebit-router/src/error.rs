/// Errors surfaced by the remote:bit service.
///
/// Only setup can fail. Sends and receives follow a silent-drop policy and
/// report problems through logs.
#[derive(Debug, thiserror::Error)]
pub enum RemoteBitError {
    /// Radio link error.
    #[error("transport error: {0}")]
    Transport(#[from] remotebit_transport::TransportError),

    /// `start` was called more than once.
    #[error("service already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, RemoteBitError>;
