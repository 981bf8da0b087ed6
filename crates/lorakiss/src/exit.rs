use std::fmt;
use std::io;

use lorakiss_ax25::Ax25Error;
use lorakiss_bridge::BridgeError;
use lorakiss_frame::FrameError;
use lorakiss_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const RADIO_ERROR: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG_INVALID: i32 = 78;
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
        io::ErrorKind::AddrInUse | io::ErrorKind::ConnectionRefused => TRANSPORT_ERROR,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

/// Malformed KISS input is a data error; I/O keeps its own mapping.
pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn link_error(context: &str, err: Ax25Error) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn bridge_error(context: &str, err: BridgeError) -> CliError {
    match err {
        BridgeError::Transport(err) => transport_error(context, err),
        BridgeError::Frame(err) => frame_error(context, err),
        BridgeError::Link(err) => link_error(context, err),
        BridgeError::Config(err) => CliError::new(CONFIG_INVALID, format!("{context}: {err}")),
        BridgeError::Radio(_) => CliError::new(RADIO_ERROR, format!("{context}: {err}")),
        BridgeError::EncodingFailure(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_map_to_codes() {
        let err = io_error("bind", io::Error::from(io::ErrorKind::AddrInUse));
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert_eq!(err.message, "bind: address in use");
        assert_eq!(
            io_error("read", io::Error::from(io::ErrorKind::TimedOut)).code,
            TIMEOUT
        );
    }

    #[test]
    fn codec_errors_are_data_errors() {
        assert_eq!(
            frame_error("decode", FrameError::TruncatedEscape).code,
            DATA_INVALID
        );
        assert_eq!(
            bridge_error("decode", BridgeError::Link(Ax25Error::MissingPayloadSeparator)).code,
            DATA_INVALID
        );
        assert_eq!(
            bridge_error("tx", BridgeError::Radio("fault".to_string())).code,
            RADIO_ERROR
        );
    }
}
