use std::fmt;
use std::io;

use atbridge_client::{BridgeError, OperationError};
use atbridge_transport::TransportError;

pub const SUCCESS: i32 = 0;
/// The bridge answered but refused the request.
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
/// A response frame or payload was corrupt or malformed.
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
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        ref denied if denied.is_permission_denied() => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        TransportError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn bridge_error(context: &str, err: BridgeError) -> CliError {
    match err {
        BridgeError::TransportFailure(err) => transport_error(context, err),
        BridgeError::Timeout => CliError::new(TIMEOUT, format!("{context}: {err}")),
        BridgeError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ref corrupt if corrupt.is_corrupt_frame() => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn op_error(context: &str, err: OperationError) -> CliError {
    match err {
        OperationError::Bridge(err) => bridge_error(context, err),
        OperationError::Device { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        OperationError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use atbridge_client::OperationError;
    use atbridge_frame::{Command, Section, Status};

    use super::*;

    #[test]
    fn bridge_errors_map_to_exit_codes() {
        assert_eq!(bridge_error("x", BridgeError::Timeout).code, TIMEOUT);
        assert_eq!(
            bridge_error("x", BridgeError::NotConnected).code,
            TRANSPORT_ERROR
        );
        assert_eq!(
            bridge_error("x", BridgeError::BadEndByte(0)).code,
            DATA_INVALID
        );
        assert_eq!(
            bridge_error(
                "x",
                BridgeError::Truncated {
                    section: Section::Header,
                    expected: 3,
                    received: 0
                }
            )
            .code,
            DATA_INVALID
        );
        assert_eq!(
            bridge_error("x", BridgeError::TransportFailure(TransportError::Closed)).code,
            TRANSPORT_ERROR
        );
    }

    #[test]
    fn operation_errors_map_to_exit_codes() {
        let device = OperationError::Device {
            command: Command::DnsResolve,
            status: Status::NoLink,
        };
        let err = op_error("dns", device);
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("dns: DNS_RESOLVE"));

        assert_eq!(
            op_error("x", OperationError::InvalidArgument("bad".into())).code,
            USAGE
        );
        assert_eq!(
            op_error("x", OperationError::UnexpectedMarker(b"NOPE".to_vec())).code,
            DATA_INVALID
        );
    }

    #[test]
    fn io_permission_denied() {
        let err = io_error("open", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
