use atbridge_transport::Link;
use bytes::BytesMut;

use crate::codec::{encode_frame, MIN_FRAME_SIZE};
use crate::error::Result;

/// Encode a frame and write it to `link` in one call.
///
/// The payload is validated before anything is written, so an oversized
/// payload fails with `PayloadTooLarge` and the link sees no bytes.
pub fn write_frame<L: Link + ?Sized>(link: &mut L, command: u8, payload: &[u8]) -> Result<()> {
    let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE + payload.len());
    encode_frame(command, payload, &mut buf)?;
    link.write_all(&buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use atbridge_transport::{MemoryLink, TransportError};

    use super::*;
    use crate::codec::MAX_PAYLOAD;
    use crate::error::FrameError;

    #[test]
    fn writes_encoded_ping() {
        let mut link = MemoryLink::new();
        write_frame(&mut link, 0x00, &[]).unwrap();
        assert_eq!(link.written(), vec![0xAA, 0x00, 0x00, 0x00, 0xFF, 0x55]);
        assert_eq!(link.write_count(), 1);
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let mut link = MemoryLink::new();
        let payload = vec![0u8; MAX_PAYLOAD + 1];

        let err = write_frame(&mut link, 0x22, &payload).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert_eq!(link.write_count(), 0);
    }

    #[test]
    fn closed_link_surfaces_transport_error() {
        let mut link = MemoryLink::new();
        link.close().unwrap();

        let err = write_frame(&mut link, 0x00, &[]).unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Closed)));
    }
}
