use std::fmt;

use atbridge_transport::TransportError;

/// Part of a frame a short read stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The start sentinel.
    Start,
    /// Command and length bytes.
    Header,
    Payload,
    /// Checksum and end sentinel.
    Footer,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Start => "start byte",
            Section::Header => "header",
            Section::Payload => "payload",
            Section::Footer => "footer",
        })
    }
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No start byte arrived before the deadline.
    #[error("timed out waiting for a frame")]
    Timeout,

    /// The first byte read was not the start sentinel.
    #[error("bad start byte 0x{0:02X} (expected 0xAA)")]
    BadStartByte(u8),

    /// The last byte of the frame was not the end sentinel.
    #[error("bad end byte 0x{0:02X} (expected 0x55)")]
    BadEndByte(u8),

    /// The payload checksum does not match the transmitted one.
    #[error("checksum mismatch (frame 0x{received:02X}, computed 0x{computed:02X})")]
    ChecksumMismatch { received: u8, computed: u8 },

    /// The frame ended (or the deadline passed) part-way through a section.
    #[error("truncated {section}: got {received} of {expected} bytes")]
    Truncated {
        section: Section,
        expected: usize,
        received: usize,
    },

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The link failed for a reason other than a short read.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
