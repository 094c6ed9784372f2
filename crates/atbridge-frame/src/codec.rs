use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum;
use crate::error::{FrameError, Result};

/// Start sentinel.
pub const START_BYTE: u8 = 0xAA;

/// End sentinel.
pub const END_BYTE: u8 = 0x55;

/// Frame header: start (1) + command (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Frame footer: checksum (1) + end (1) = 2 bytes.
pub const FOOTER_SIZE: usize = 2;

/// Smallest possible frame (empty payload).
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + FOOTER_SIZE;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command opcode as transmitted.
    pub command: u8,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(command: impl Into<u8>, payload: impl Into<Bytes>) -> Self {
        Self {
            command: command.into(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + footer).
    pub fn wire_size(&self) -> usize {
        MIN_FRAME_SIZE + self.payload.len()
    }

    /// Encode this frame into its wire representation.
    pub fn to_bytes(&self) -> Result<Bytes> {
        encode(self.command, &self.payload)
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────┬─────────┬──────────┬─────────────┬──────────┬──────┐
/// │ Start │ Command │ Length   │ Payload     │ CRC-8    │ End  │
/// │ 0xAA  │ (1B)    │ (2B BE)  │ (Length B)  │ (1B)     │ 0x55 │
/// └───────┴─────────┴──────────┴─────────────┴──────────┴──────┘
/// ```
pub fn encode_frame(command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(MIN_FRAME_SIZE + payload.len());
    dst.put_u8(START_BYTE);
    dst.put_u8(command);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    dst.put_u8(checksum::compute(payload));
    dst.put_u8(END_BYTE);
    Ok(())
}

/// Encode a frame into a freshly allocated buffer.
pub fn encode(command: u8, payload: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE + payload.len());
    encode_frame(command, payload, &mut buf)?;
    Ok(buf.freeze())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. On error the buffer
/// is left untouched; there is no scan for the next start byte.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    let Some(&start) = src.first() else {
        return Ok(None);
    };
    if start != START_BYTE {
        return Err(FrameError::BadStartByte(start));
    }
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let command = src[1];
    let payload_len = u16::from_be_bytes([src[2], src[3]]) as usize;
    let total = HEADER_SIZE + payload_len + FOOTER_SIZE;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let payload_end = HEADER_SIZE + payload_len;
    let received = src[payload_end];
    let end = src[payload_end + 1];
    if end != END_BYTE {
        return Err(FrameError::BadEndByte(end));
    }
    let computed = checksum::compute(&src[HEADER_SIZE..payload_end]);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    src.advance(FOOTER_SIZE);

    Ok(Some(Frame { command, payload }))
}
