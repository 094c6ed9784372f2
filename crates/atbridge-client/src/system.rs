use atbridge_frame::Command;
use atbridge_transport::Link;

use crate::client::BridgeClient;
use crate::error::{OpResult, OperationError};
use crate::types::{FirmwareVersion, SystemStatus};

/// Marker the bridge returns after the status byte of a ping reply.
pub const PONG: &[u8; 4] = b"PONG";

/// System commands: liveness, version, status, reset, LED.
pub struct System<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> System<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    /// Round-trip a `PING` and check for the `PONG` marker.
    pub fn ping(&mut self) -> OpResult<()> {
        let mut resp = self.client.call(Command::Ping, &[], None)?;
        let marker = resp.array::<4>()?;
        if &marker != PONG {
            return Err(OperationError::UnexpectedMarker(marker.to_vec()));
        }
        Ok(())
    }

    pub fn version(&mut self) -> OpResult<FirmwareVersion> {
        let mut resp = self.client.call(Command::GetVersion, &[], None)?;
        resp.require(3)?;
        Ok(FirmwareVersion {
            major: resp.u8()?,
            minor: resp.u8()?,
            patch: resp.u8()?,
        })
    }

    pub fn status(&mut self) -> OpResult<SystemStatus> {
        let mut resp = self.client.call(Command::GetStatus, &[], None)?;
        resp.require(8)?;
        Ok(SystemStatus {
            eth_initialized: resp.flag()?,
            eth_link_up: resp.flag()?,
            rtc_present: resp.flag()?,
            uptime_hours: resp.u8()?,
            uptime_minutes: resp.u8()?,
            uptime_seconds: resp.u8()?,
            free_ram: resp.u16()?,
        })
    }

    /// Ask the bridge to reboot. It acknowledges before resetting, so the
    /// next transaction should wait for the boot settle interval.
    pub fn reset(&mut self) -> OpResult<()> {
        self.client.call(Command::Reset, &[], None)?;
        Ok(())
    }

    pub fn set_led(&mut self, on: bool) -> OpResult<()> {
        self.client.call(Command::SetLed, &[u8::from(on)], None)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use atbridge_frame::{decode_frame, encode, Status};
    use atbridge_transport::MemoryLink;
    use bytes::BytesMut;

    use super::*;
    use crate::error::BridgeError;

    /// A link that answers every request with `cmd | 0x80` and the body
    /// produced by `reply` from the request payload.
    pub(crate) fn scripted<F>(mut reply: F) -> (BridgeClient<MemoryLink>, MemoryLink)
    where
        F: FnMut(u8, &[u8]) -> Vec<u8> + Send + 'static,
    {
        let link = MemoryLink::with_responder(move |request| {
            let mut buf = BytesMut::from(request);
            let frame = decode_frame(&mut buf).ok()??;
            let body = reply(frame.command, &frame.payload);
            Some(encode(frame.command | 0x80, &body).ok()?.to_vec())
        });
        (BridgeClient::new(link.clone()), link)
    }

    /// Payload of the last request written to `link`.
    pub(crate) fn last_request(link: &MemoryLink) -> (u8, Vec<u8>) {
        let mut buf = BytesMut::from(link.take_written().as_slice());
        let mut last = None;
        while let Ok(Some(frame)) = decode_frame(&mut buf) {
            last = Some((frame.command, frame.payload.to_vec()));
        }
        last.unwrap_or_default()
    }

    #[test]
    fn ping_accepts_pong() {
        let (mut client, link) = scripted(|_, _| b"\x00PONG".to_vec());
        client.system().ping().unwrap();
        assert_eq!(last_request(&link), (0x00, vec![]));
    }

    #[test]
    fn ping_rejects_other_marker() {
        let (mut client, _) = scripted(|_, _| b"\x00PING".to_vec());
        let err = client.system().ping().unwrap_err();
        assert!(matches!(err, OperationError::UnexpectedMarker(m) if m == b"PING"));
    }

    #[test]
    fn ping_short_reply() {
        let (mut client, _) = scripted(|_, _| b"\x00PO".to_vec());
        let err = client.system().ping().unwrap_err();
        assert!(matches!(
            err,
            OperationError::ShortResponse {
                command: Command::Ping,
                expected: 5,
                actual: 3
            }
        ));
    }

    #[test]
    fn version_fields() {
        let (mut client, _) = scripted(|_, _| vec![0x00, 1, 4, 2]);
        let version = client.system().version().unwrap();
        assert_eq!(version.to_string(), "1.4.2");
    }

    #[test]
    fn status_fields() {
        let (mut client, _) = scripted(|_, _| vec![0x00, 1, 0, 1, 2, 30, 15, 0x02, 0x10]);
        let status = client.system().status().unwrap();
        assert!(status.eth_initialized);
        assert!(!status.eth_link_up);
        assert!(status.rtc_present);
        assert_eq!(status.uptime().as_secs(), 2 * 3600 + 30 * 60 + 15);
        assert_eq!(status.free_ram, 0x0210);
    }

    #[test]
    fn device_status_is_reported() {
        let (mut client, _) = scripted(|_, _| vec![0x05]);
        let err = client.system().version().unwrap_err();
        assert!(matches!(
            err,
            OperationError::Device {
                command: Command::GetVersion,
                status: Status::Busy
            }
        ));
    }

    #[test]
    fn set_led_payload() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        client.system().set_led(true).unwrap();
        assert_eq!(last_request(&link), (0x04, vec![1]));
        client.system().reset().unwrap();
        assert_eq!(last_request(&link), (0x02, vec![]));
    }

    #[test]
    fn link_errors_pass_through() {
        let link = MemoryLink::new();
        let mut client = BridgeClient::new(link);
        let err = client.system().ping().unwrap_err();
        assert!(matches!(err, OperationError::Bridge(BridgeError::Timeout)));
    }
}
