use bytes::Bytes;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the endpoint.
    #[error("failed to open {endpoint}: {source}")]
    Open {
        endpoint: String,
        source: serialport::Error,
    },

    /// The serial driver rejected a configuration or control request.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The read deadline elapsed before all requested bytes arrived.
    #[error("timed out after {} of {expected} bytes", .partial.len())]
    Timeout { expected: usize, partial: Bytes },

    /// The stream ended before all requested bytes arrived.
    #[error("stream ended after {} of {expected} bytes", .partial.len())]
    Truncated { expected: usize, partial: Bytes },

    /// The link has been closed.
    #[error("link closed")]
    Closed,
}

impl TransportError {
    /// Bytes received before a short read stopped, if this is a short read.
    pub fn partial(&self) -> Option<&Bytes> {
        match self {
            TransportError::Timeout { partial, .. } | TransportError::Truncated { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }

    /// Whether the link can no longer be used after this error.
    ///
    /// Short reads leave the link usable; the next transaction discards
    /// whatever arrives late.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TransportError::Timeout { .. } | TransportError::Truncated { .. }
        )
    }

    /// The OS refused access to the device (commonly a missing group membership).
    pub fn is_permission_denied(&self) -> bool {
        let denied = std::io::ErrorKind::PermissionDenied;
        match self {
            TransportError::Open { source, .. } | TransportError::Serial(source) => {
                source.kind() == serialport::ErrorKind::Io(denied)
            }
            TransportError::Io(err) => err.kind() == denied,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reads_are_recoverable() {
        let err = TransportError::Timeout {
            expected: 4,
            partial: Bytes::from_static(&[1, 2]),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.partial().map(|p| p.len()), Some(2));
        assert_eq!(err.to_string(), "timed out after 2 of 4 bytes");
    }

    #[test]
    fn io_and_closed_are_fatal() {
        let io = TransportError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(io.is_fatal());
        assert!(io.partial().is_none());
        assert!(TransportError::Closed.is_fatal());
    }

    #[test]
    fn permission_denied_on_open() {
        let err = TransportError::Open {
            endpoint: "/dev/ttyS0".into(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
                "Permission denied",
            ),
        };
        assert!(err.is_permission_denied());
        assert!(!TransportError::Closed.is_permission_denied());
    }
}
