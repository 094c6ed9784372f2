use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// Default serial bit rate of the bridge firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// A duplex byte channel to the bridge with bounded-time reads and writes.
///
/// Implementations are blocking. A link is used by exactly one client at a
/// time; callers that share one must serialize access themselves.
pub trait Link {
    /// Write all bytes, blocking until accepted or the write timeout elapses.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `len` bytes, blocking for at most `timeout`.
    ///
    /// A short read returns [`TransportError::Timeout`] (deadline elapsed) or
    /// [`TransportError::Truncated`] (stream ended) carrying the bytes that did
    /// arrive, so the caller can decide what the shortfall means.
    ///
    /// [`TransportError::Timeout`]: crate::TransportError::Timeout
    /// [`TransportError::Truncated`]: crate::TransportError::Truncated
    fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Bytes>;

    /// Drop any buffered, unread input.
    fn discard_pending_input(&mut self) -> Result<()>;

    /// Release the underlying device. Further I/O fails with `Closed`.
    fn close(&mut self) -> Result<()>;

    /// Endpoint identifier for diagnostics.
    fn endpoint(&self) -> &str;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Bytes> {
        (**self).read_exact(len, timeout)
    }

    fn discard_pending_input(&mut self) -> Result<()> {
        (**self).discard_pending_input()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Configuration for opening a link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Device path or port name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub endpoint: String,
    /// Serial bit rate. Default: 115200.
    pub baud_rate: u32,
    /// The peer resets when the port opens (DTR toggle) and must boot first.
    pub wait_for_boot: bool,
    /// Pause after open when `wait_for_boot` is set. Default: 2 s.
    pub boot_settle: Duration,
    /// Pause after open when `wait_for_boot` is clear. Default: 100 ms.
    pub stabilize: Duration,
    /// Upper bound for a single blocking write.
    pub write_timeout: Duration,
}

impl LinkConfig {
    /// Configuration for `endpoint` with all other fields at their defaults.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// The pause `open` must take before the link is handed out.
    pub fn settle_delay(&self) -> Duration {
        if self.wait_for_boot {
            self.boot_settle
        } else {
            self.stabilize
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            wait_for_boot: true,
            boot_settle: Duration::from_secs(2),
            stabilize: Duration::from_millis(100),
            write_timeout: Duration::from_secs(1),
        }
    }
}
