use std::fmt;
use std::io;

use remotebit::frame::FrameError;
use remotebit::transport::TransportError;
use remotebit::RemoteBitError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        TransportError::InvalidPower(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::InvalidHex(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::InvalidId(_) | FrameError::UnknownComponent(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

pub fn remotebit_error(context: &str, err: RemoteBitError) -> CliError {
    match err {
        RemoteBitError::Transport(err) => transport_error(context, err),
        RemoteBitError::AlreadyStarted => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_refused_maps_to_failure() {
        let err = transport_error(
            "connect failed",
            TransportError::Connect {
                path: "/tmp/x.sock".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("connect failed: "));
    }

    #[test]
    fn link_io_errors_map_by_kind() {
        let denied = transport_error(
            "start failed",
            TransportError::Io(io::Error::from(io::ErrorKind::PermissionDenied)),
        );
        assert_eq!(denied.code, PERMISSION_DENIED);

        let broken = transport_error(
            "send failed",
            TransportError::Io(io::Error::from(io::ErrorKind::BrokenPipe)),
        );
        assert_eq!(broken.code, INTERNAL);
        assert_eq!(
            transport_error("x", TransportError::NotStarted).code,
            TRANSPORT_ERROR
        );
    }

    #[test]
    fn frame_errors_map_to_usage_or_data() {
        assert_eq!(frame_error("x", FrameError::InvalidId(16)).code, USAGE);
        assert_eq!(
            frame_error("x", FrameError::InvalidHex("zz".into())).code,
            DATA_INVALID
        );
    }

    #[test]
    fn path_too_long_maps_to_transport_error() {
        let err = remotebit_error(
            "start failed",
            RemoteBitError::Transport(TransportError::PathTooLong {
                path: "/tmp/long".into(),
                len: 200,
                max: 108,
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
