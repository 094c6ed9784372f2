use std::time::Duration;

use atbridge_frame::{read_frame, write_frame, Command};
use atbridge_transport::{Link, LinkConfig, SerialLink};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{BridgeError, OpResult, Result};
use crate::ethernet::Ethernet;
use crate::i2c::I2c;
use crate::response::Response;
use crate::rtc::Rtc;
use crate::system::System;
use crate::tcp::Tcp;
use crate::udp::Udp;

/// Transaction timeout used by [`BridgeClient::request`] and the facades.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a transaction when the caller does not pass one.
    pub default_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Whether a client currently holds its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// Request/response client over one exclusively owned link.
///
/// Each transaction drops stale input, writes one frame and reads one frame
/// back. Timeouts and corrupt frames leave the session open; the next
/// transaction's discard is the recovery. An I/O failure or disconnect
/// closes the session, after which every call returns
/// [`BridgeError::NotConnected`].
pub struct BridgeClient<L: Link = SerialLink> {
    link: Option<L>,
    config: ClientConfig,
}

impl BridgeClient<SerialLink> {
    /// Open a serial link and wrap it in a client.
    pub fn open(link_config: &LinkConfig, config: ClientConfig) -> Result<Self> {
        let link = SerialLink::open(link_config).map_err(BridgeError::TransportFailure)?;
        Ok(Self::with_config(link, config))
    }
}

impl<L: Link> BridgeClient<L> {
    /// Wrap an already open link with the default configuration.
    pub fn new(link: L) -> Self {
        Self::with_config(link, ClientConfig::default())
    }

    pub fn with_config(link: L, config: ClientConfig) -> Self {
        Self {
            link: Some(link),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.link.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Endpoint of the held link, if open.
    pub fn endpoint(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.endpoint())
    }

    /// Release the link. Closing a closed client is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut link) = self.link.take() {
            link.close().map_err(BridgeError::TransportFailure)?;
            debug!(endpoint = link.endpoint(), "session closed");
        }
        Ok(())
    }

    /// Run one transaction and return the response payload unchanged.
    ///
    /// The response command byte is not compared with the request.
    pub fn transceive(
        &mut self,
        command: impl Into<u8>,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        let command = command.into();
        let link = self.link.as_mut().ok_or(BridgeError::NotConnected)?;

        match exchange(link, command, payload, timeout) {
            Err(err) if err.is_fatal() => {
                if let Some(mut link) = self.link.take() {
                    warn!(
                        endpoint = link.endpoint(),
                        command = format_args!("0x{command:02X}"),
                        error = %err,
                        "transport failed, closing session"
                    );
                    if let Err(close_err) = link.close() {
                        debug!(error = %close_err, "close after failure");
                    }
                }
                Err(err)
            }
            other => other,
        }
    }

    /// [`transceive`](Self::transceive) with the configured default timeout.
    pub fn request(&mut self, command: impl Into<u8>, payload: &[u8]) -> Result<Bytes> {
        let timeout = self.config.default_timeout;
        self.transceive(command, payload, timeout)
    }

    /// Transaction plus status check, shared by the facades.
    pub(crate) fn call(
        &mut self,
        command: Command,
        payload: &[u8],
        timeout: Option<Duration>,
    ) -> OpResult<Response> {
        let timeout = timeout.unwrap_or(self.config.default_timeout);
        let reply = self.transceive(command, payload, timeout)?;
        Response::parse(command, reply)
    }

    pub fn system(&mut self) -> System<'_, L> {
        System::new(self)
    }

    pub fn ethernet(&mut self) -> Ethernet<'_, L> {
        Ethernet::new(self)
    }

    pub fn udp(&mut self) -> Udp<'_, L> {
        Udp::new(self)
    }

    pub fn tcp(&mut self) -> Tcp<'_, L> {
        Tcp::new(self)
    }

    pub fn rtc(&mut self) -> Rtc<'_, L> {
        Rtc::new(self)
    }

    pub fn i2c(&mut self) -> I2c<'_, L> {
        I2c::new(self)
    }
}

impl<L: Link> std::fmt::Debug for BridgeClient<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("endpoint", &self.endpoint())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}

fn exchange<L: Link>(
    link: &mut L,
    command: u8,
    payload: &[u8],
    timeout: Duration,
) -> Result<Bytes> {
    link.discard_pending_input()
        .map_err(BridgeError::TransportFailure)?;
    write_frame(link, command, payload)?;
    let frame = read_frame(link, timeout)?;
    Ok(frame.payload)
}

#[cfg(test)]
mod tests {
    use atbridge_frame::{encode, Section, MAX_PAYLOAD};
    use atbridge_transport::{MemoryLink, TransportError};

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(20);

    fn pong() -> Vec<u8> {
        encode(0x80, b"\x00PONG").unwrap().to_vec()
    }

    #[test]
    fn ping_exchange() {
        let link = MemoryLink::new();
        link.queue_reply(pong());
        let mut client = BridgeClient::new(link.clone());

        let payload = client.transceive(Command::Ping, &[], TIMEOUT).unwrap();
        assert_eq!(payload.as_ref(), b"\x00PONG");
        assert_eq!(link.written(), vec![0xAA, 0x00, 0x00, 0x00, 0xFF, 0x55]);
        assert!(client.is_open());
    }

    #[test]
    fn closed_client_does_not_touch_link() {
        let link = MemoryLink::new();
        let mut client = BridgeClient::new(link.clone());
        client.close().unwrap();
        assert_eq!(client.state(), SessionState::Closed);
        assert!(link.is_closed());

        let err = client.transceive(0x00, &[], TIMEOUT).unwrap_err();
        assert!(matches!(err, BridgeError::NotConnected));
        assert_eq!(link.write_count(), 0);
        assert_eq!(link.discard_count(), 0);

        // Closing twice is fine.
        client.close().unwrap();
    }

    #[test]
    fn stale_input_is_discarded_before_request() {
        let link = MemoryLink::new();
        link.inject(&[0x13, 0x37, 0xAA]);
        link.queue_reply(pong());
        let mut client = BridgeClient::new(link.clone());

        client.transceive(0x00, &[], TIMEOUT).unwrap();
        assert_eq!(link.discarded_bytes(), 3);
    }

    #[test]
    fn truncated_then_recovers() {
        let link = MemoryLink::new();
        let full = pong();
        link.queue_reply(full[..full.len() - 2].to_vec());
        let mut client = BridgeClient::new(link.clone());

        let err = client.transceive(0x00, &[], TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Truncated {
                section: Section::Footer,
                ..
            }
        ));
        assert!(client.is_open());

        // The rest of the slow reply arrives late.
        link.inject(&full[full.len() - 2..]);
        link.queue_reply(pong());

        let payload = client.transceive(0x00, &[], TIMEOUT).unwrap();
        assert_eq!(payload.as_ref(), b"\x00PONG");
        assert_eq!(link.discarded_bytes(), 2);
    }

    #[test]
    fn timeout_keeps_session_open() {
        let link = MemoryLink::new();
        let mut client = BridgeClient::new(link);

        assert!(matches!(
            client.transceive(0x00, &[], TIMEOUT),
            Err(BridgeError::Timeout)
        ));
        assert!(client.is_open());
    }

    #[test]
    fn bad_start_byte_then_recovers() {
        let link = MemoryLink::new();
        let mut garbage = vec![0x00];
        garbage.extend(pong());
        link.queue_reply(garbage);
        link.queue_reply(pong());
        let mut client = BridgeClient::new(link.clone());

        assert!(matches!(
            client.transceive(0x00, &[], TIMEOUT),
            Err(BridgeError::BadStartByte(0x00))
        ));
        assert!(client.transceive(0x00, &[], TIMEOUT).is_ok());
    }

    #[test]
    fn response_command_is_not_checked() {
        let link = MemoryLink::new();
        link.queue_reply(encode(0x7E, &[0x00]).unwrap().to_vec());
        let mut client = BridgeClient::new(link);

        assert_eq!(
            client.transceive(0x01, &[], TIMEOUT).unwrap().as_ref(),
            &[0x00]
        );
    }

    #[test]
    fn oversized_payload_is_not_written() {
        let link = MemoryLink::new();
        let mut client = BridgeClient::new(link.clone());

        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let err = client.transceive(0x22, &payload, TIMEOUT).unwrap_err();
        assert!(matches!(err, BridgeError::PayloadTooLarge { .. }));
        assert_eq!(link.write_count(), 0);
        assert!(client.is_open());
    }

    /// Link whose writes always fail with an I/O error.
    struct BrokenLink {
        inner: MemoryLink,
    }

    impl Link for BrokenLink {
        fn write_all(&mut self, _bytes: &[u8]) -> atbridge_transport::Result<()> {
            Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            )))
        }

        fn read_exact(
            &mut self,
            len: usize,
            timeout: Duration,
        ) -> atbridge_transport::Result<Bytes> {
            self.inner.read_exact(len, timeout)
        }

        fn discard_pending_input(&mut self) -> atbridge_transport::Result<()> {
            self.inner.discard_pending_input()
        }

        fn close(&mut self) -> atbridge_transport::Result<()> {
            self.inner.close()
        }

        fn endpoint(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn fatal_write_failure_closes_session() {
        let inner = MemoryLink::new();
        let mut client = BridgeClient::new(BrokenLink {
            inner: inner.clone(),
        });

        let err = client.transceive(0x00, &[], TIMEOUT).unwrap_err();
        assert!(matches!(err, BridgeError::TransportFailure(TransportError::Io(_))));
        assert!(!client.is_open());
        assert!(inner.is_closed());
        assert!(matches!(
            client.transceive(0x00, &[], TIMEOUT),
            Err(BridgeError::NotConnected)
        ));
    }

    #[test]
    fn request_uses_default_timeout() {
        let link = MemoryLink::new();
        link.queue_reply(pong());
        let mut client = BridgeClient::with_config(
            link,
            ClientConfig {
                default_timeout: Duration::from_millis(5),
            },
        );
        assert_eq!(client.config().default_timeout, Duration::from_millis(5));
        assert!(client.request(Command::Ping, &[]).is_ok());
        assert_eq!(client.endpoint(), Some("memory"));
    }
}
