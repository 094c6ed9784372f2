use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use atbridge_frame::{Command, Status};
use atbridge_transport::Link;
use bytes::{BufMut, BytesMut};

use crate::client::BridgeClient;
use crate::error::{OpResult, OperationError};
use crate::types::UdpDatagram;

/// Number of hardware sockets on the bridge's Ethernet controller.
pub const SOCKET_COUNT: u8 = 8;

/// Longest hostname `DNS_RESOLVE` accepts.
pub const MAX_HOSTNAME_LEN: usize = 63;

/// The bridge gives up on a DNS query after 5 s; allow for the reply frame.
pub const DNS_TIMEOUT: Duration = Duration::from_secs(6);

pub(crate) fn check_socket(socket: u8) -> OpResult<()> {
    if socket >= SOCKET_COUNT {
        return Err(OperationError::invalid(format!(
            "socket {socket} out of range (0..{SOCKET_COUNT})"
        )));
    }
    Ok(())
}

/// UDP sockets and DNS resolution.
pub struct Udp<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> Udp<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    /// Open `socket` bound to a local port.
    pub fn begin(&mut self, socket: u8, local_port: u16) -> OpResult<()> {
        check_socket(socket)?;
        let mut req = BytesMut::with_capacity(3);
        req.put_u8(socket);
        req.put_u16(local_port);
        self.client.call(Command::UdpBegin, &req, None)?;
        Ok(())
    }

    /// Send one datagram. Returns the byte count the bridge accepted.
    pub fn send(&mut self, socket: u8, dest: SocketAddrV4, data: &[u8]) -> OpResult<u16> {
        check_socket(socket)?;
        let mut req = BytesMut::with_capacity(7 + data.len());
        req.put_u8(socket);
        req.put_slice(&dest.ip().octets());
        req.put_u16(dest.port());
        req.put_slice(data);
        self.client.call(Command::UdpSend, &req, None)?.u16()
    }

    /// Poll for one datagram of at most `max_len` bytes.
    ///
    /// Returns `None` when the bridge reports `NO_DATA`.
    pub fn receive(&mut self, socket: u8, max_len: u16) -> OpResult<Option<UdpDatagram>> {
        check_socket(socket)?;
        if max_len == 0 {
            return Err(OperationError::invalid("max_len must be at least 1"));
        }
        let mut req = BytesMut::with_capacity(3);
        req.put_u8(socket);
        req.put_u16(max_len);

        let mut resp = match self.client.call(Command::UdpRecv, &req, None) {
            Ok(resp) => resp,
            Err(OperationError::Device {
                status: Status::NoData,
                ..
            }) => return Ok(None),
            Err(err) => return Err(err),
        };
        resp.require(8)?;
        let ip = resp.ipv4()?;
        let port = resp.u16()?;
        let len = resp.u16()?;
        let data = resp.take(usize::from(len))?;
        Ok(Some(UdpDatagram {
            source: SocketAddrV4::new(ip, port),
            data,
        }))
    }

    /// Bytes waiting on `socket`.
    pub fn available(&mut self, socket: u8) -> OpResult<u16> {
        check_socket(socket)?;
        self.client.call(Command::UdpAvailable, &[socket], None)?.u16()
    }

    pub fn close(&mut self, socket: u8) -> OpResult<()> {
        check_socket(socket)?;
        self.client.call(Command::UdpClose, &[socket], None)?;
        Ok(())
    }

    /// Resolve `hostname` to an IPv4 address using the bridge's DNS server.
    pub fn dns_resolve(&mut self, hostname: &str) -> OpResult<Ipv4Addr> {
        if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
            return Err(OperationError::invalid(format!(
                "hostname must be 1..={MAX_HOSTNAME_LEN} bytes, got {}",
                hostname.len()
            )));
        }
        if hostname.contains('\0') {
            return Err(OperationError::invalid("hostname contains NUL"));
        }
        let mut req = BytesMut::with_capacity(hostname.len() + 1);
        req.put_slice(hostname.as_bytes());
        req.put_u8(0);
        self.client
            .call(Command::DnsResolve, &req, Some(DNS_TIMEOUT))?
            .ipv4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::tests::{last_request, scripted};

    #[test]
    fn begin_layout() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        client.udp().begin(1, 5000).unwrap();
        assert_eq!(last_request(&link), (0x20, vec![1, 0x13, 0x88]));
    }

    #[test]
    fn send_layout_and_count() {
        let (mut client, link) = scripted(|_, payload| {
            let sent = (payload.len() - 7) as u16;
            let mut reply = vec![0x00];
            reply.extend_from_slice(&sent.to_be_bytes());
            reply
        });
        let dest = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 9), 1700);
        assert_eq!(client.udp().send(0, dest, b"hello").unwrap(), 5);

        let (cmd, payload) = last_request(&link);
        assert_eq!(cmd, 0x22);
        assert_eq!(&payload[..7], &[0, 10, 0, 0, 9, 0x06, 0xA4]);
        assert_eq!(&payload[7..], b"hello");
    }

    #[test]
    fn receive_datagram() {
        let (mut client, link) = scripted(|_, _| {
            vec![0x00, 192, 168, 1, 7, 0x1F, 0x90, 0x00, 0x03, b'a', b'b', b'c']
        });
        let datagram = client.udp().receive(2, 256).unwrap().unwrap();
        assert_eq!(
            datagram.source,
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 7), 8080)
        );
        assert_eq!(datagram.data.as_ref(), b"abc");
        assert_eq!(last_request(&link), (0x23, vec![2, 0x01, 0x00]));
    }

    #[test]
    fn receive_no_data_is_none() {
        let (mut client, _) = scripted(|_, _| vec![0x08]);
        assert!(client.udp().receive(0, 64).unwrap().is_none());
    }

    #[test]
    fn receive_short_body() {
        let (mut client, _) =
            scripted(|_, _| vec![0x00, 192, 168, 1, 7, 0x1F, 0x90, 0x00, 0x05, b'a']);
        let err = client.udp().receive(0, 64).unwrap_err();
        assert!(matches!(
            err,
            OperationError::ShortResponse {
                expected: 14,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn available_and_close() {
        let (mut client, link) = scripted(|cmd, _| match cmd {
            0x24 => vec![0x00, 0x01, 0x02],
            _ => vec![0x00],
        });
        assert_eq!(client.udp().available(3).unwrap(), 0x0102);
        assert_eq!(last_request(&link), (0x24, vec![3]));
        client.udp().close(3).unwrap();
        assert_eq!(last_request(&link), (0x21, vec![3]));
    }

    #[test]
    fn socket_range_checked_before_sending() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        let err = client.udp().close(SOCKET_COUNT).unwrap_err();
        assert!(matches!(err, OperationError::InvalidArgument(_)));
        assert_eq!(link.write_count(), 0);
    }

    #[test]
    fn dns_request_is_nul_terminated() {
        let (mut client, link) = scripted(|_, _| vec![0x00, 93, 184, 216, 34]);
        let ip = client.udp().dns_resolve("example.com").unwrap();
        assert_eq!(ip, Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(last_request(&link), (0x25, b"example.com\0".to_vec()));
    }

    #[test]
    fn dns_hostname_length_limits() {
        let (mut client, link) = scripted(|_, _| vec![0x00, 1, 2, 3, 4]);
        assert!(client.udp().dns_resolve(&"a".repeat(63)).is_ok());
        assert!(matches!(
            client.udp().dns_resolve(&"a".repeat(64)),
            Err(OperationError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.udp().dns_resolve(""),
            Err(OperationError::InvalidArgument(_))
        ));
        assert_eq!(link.write_count(), 1);
    }
}
