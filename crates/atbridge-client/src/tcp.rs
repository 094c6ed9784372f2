use std::net::SocketAddrV4;
use std::time::Duration;

use atbridge_frame::{Command, Status};
use atbridge_transport::Link;
use bytes::{BufMut, Bytes, BytesMut};

use crate::client::BridgeClient;
use crate::error::{OpResult, OperationError};
use crate::types::TcpState;
use crate::udp::check_socket;

/// Connect timeout used when the caller has no preference.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u16 = 5000;

/// Margin added to the device-side connect timeout for the reply frame.
const CONNECT_REPLY_MARGIN: Duration = Duration::from_secs(1);

/// TCP sockets.
pub struct Tcp<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> Tcp<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    /// Connect `socket` to `dest`, letting the bridge wait up to `timeout_ms`.
    pub fn connect(&mut self, socket: u8, dest: SocketAddrV4, timeout_ms: u16) -> OpResult<()> {
        check_socket(socket)?;
        let mut req = BytesMut::with_capacity(9);
        req.put_u8(socket);
        req.put_slice(&dest.ip().octets());
        req.put_u16(dest.port());
        req.put_u16(timeout_ms);

        let timeout = Duration::from_millis(u64::from(timeout_ms)) + CONNECT_REPLY_MARGIN;
        self.client.call(Command::TcpConnect, &req, Some(timeout))?;
        Ok(())
    }

    /// Put `socket` in listen state on a local port.
    pub fn listen(&mut self, socket: u8, local_port: u16) -> OpResult<()> {
        check_socket(socket)?;
        let mut req = BytesMut::with_capacity(3);
        req.put_u8(socket);
        req.put_u16(local_port);
        self.client.call(Command::TcpListen, &req, None)?;
        Ok(())
    }

    /// Returns the byte count the bridge accepted.
    pub fn send(&mut self, socket: u8, data: &[u8]) -> OpResult<u16> {
        check_socket(socket)?;
        let mut req = BytesMut::with_capacity(1 + data.len());
        req.put_u8(socket);
        req.put_slice(data);
        self.client.call(Command::TcpSend, &req, None)?.u16()
    }

    /// Read up to `max_len` bytes. An empty result means nothing was
    /// buffered (`NO_DATA`).
    pub fn receive(&mut self, socket: u8, max_len: u16) -> OpResult<Bytes> {
        check_socket(socket)?;
        if max_len == 0 {
            return Err(OperationError::invalid("max_len must be at least 1"));
        }
        let mut req = BytesMut::with_capacity(3);
        req.put_u8(socket);
        req.put_u16(max_len);

        let mut resp = match self.client.call(Command::TcpRecv, &req, None) {
            Ok(resp) => resp,
            Err(OperationError::Device {
                status: Status::NoData,
                ..
            }) => return Ok(Bytes::new()),
            Err(err) => return Err(err),
        };
        let len = resp.u16()?;
        resp.take(usize::from(len))
    }

    pub fn available(&mut self, socket: u8) -> OpResult<u16> {
        check_socket(socket)?;
        self.client.call(Command::TcpAvailable, &[socket], None)?.u16()
    }

    pub fn close(&mut self, socket: u8) -> OpResult<()> {
        check_socket(socket)?;
        self.client.call(Command::TcpClose, &[socket], None)?;
        Ok(())
    }

    /// Raw socket state; see [`TcpState::is_established`].
    pub fn status(&mut self, socket: u8) -> OpResult<TcpState> {
        check_socket(socket)?;
        let state = self.client.call(Command::TcpStatus, &[socket], None)?.u8()?;
        Ok(TcpState(state))
    }

    pub fn is_connected(&mut self, socket: u8) -> OpResult<bool> {
        Ok(self.status(socket)?.is_established())
    }
}
