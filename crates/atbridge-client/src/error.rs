use atbridge_frame::{Command, FrameError, Section, Status};
use atbridge_transport::TransportError;

/// Errors from a single transaction.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The session is closed; the link was not touched.
    #[error("not connected")]
    NotConnected,

    /// Write failure or an unrecoverable read failure.
    #[error("transport failure: {0}")]
    TransportFailure(TransportError),

    /// No response started before the timeout.
    #[error("timed out waiting for response")]
    Timeout,

    #[error("truncated response {section}: got {received} of {expected} bytes")]
    Truncated {
        section: Section,
        expected: usize,
        received: usize,
    },

    #[error("bad start byte 0x{0:02X}")]
    BadStartByte(u8),

    #[error("bad end byte 0x{0:02X}")]
    BadEndByte(u8),

    #[error("checksum mismatch (frame 0x{received:02X}, computed 0x{computed:02X})")]
    ChecksumMismatch { received: u8, computed: u8 },

    /// The request payload does not fit a frame; nothing was written.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl BridgeError {
    /// Whether the failure ends the session.
    pub fn is_fatal(&self) -> bool {
        match self {
            BridgeError::TransportFailure(err) => err.is_fatal(),
            _ => false,
        }
    }

    /// The response arrived but was corrupt.
    pub fn is_corrupt_frame(&self) -> bool {
        matches!(
            self,
            BridgeError::BadStartByte(_)
                | BridgeError::BadEndByte(_)
                | BridgeError::ChecksumMismatch { .. }
                | BridgeError::Truncated { .. }
        )
    }
}

impl From<FrameError> for BridgeError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Timeout => BridgeError::Timeout,
            FrameError::BadStartByte(byte) => BridgeError::BadStartByte(byte),
            FrameError::BadEndByte(byte) => BridgeError::BadEndByte(byte),
            FrameError::ChecksumMismatch { received, computed } => {
                BridgeError::ChecksumMismatch { received, computed }
            }
            FrameError::Truncated {
                section,
                expected,
                received,
            } => BridgeError::Truncated {
                section,
                expected,
                received,
            },
            FrameError::PayloadTooLarge { size, max } => BridgeError::PayloadTooLarge { size, max },
            FrameError::Transport(err) => BridgeError::TransportFailure(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors from a typed subsystem operation.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// The transaction itself failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The bridge answered with a non-OK status.
    #[error("{command} failed: {status}")]
    Device { command: Command, status: Status },

    /// The response is shorter than its fixed layout.
    #[error("{command} response too short: {actual} of {expected} bytes")]
    ShortResponse {
        command: Command,
        expected: usize,
        actual: usize,
    },

    /// Rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A ping reply carried something other than `PONG`.
    #[error("unexpected ping marker {0:?}")]
    UnexpectedMarker(Vec<u8>),
}

impl OperationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        OperationError::InvalidArgument(message.into())
    }

    /// Device status, if the bridge reported one.
    pub fn status(&self) -> Option<Status> {
        match self {
            OperationError::Device { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type OpResult<T> = std::result::Result<T, OperationError>;
