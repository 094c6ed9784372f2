use std::time::{Duration, Instant};

use atbridge_transport::{Link, TransportError};
use bytes::Bytes;

use crate::checksum;
use crate::codec::{Frame, END_BYTE, FOOTER_SIZE, HEADER_SIZE, START_BYTE};
use crate::error::{FrameError, Result, Section};

/// Read exactly one frame from `link` within `timeout`.
///
/// All reads share a single deadline. Validation is strict and there is no
/// resynchronization: a wrong first byte fails immediately with only that byte
/// consumed, and whatever follows stays unread for the caller to discard.
/// The command byte is returned as received.
pub fn read_frame<L: Link + ?Sized>(link: &mut L, timeout: Duration) -> Result<Frame> {
    let deadline = Instant::now() + timeout;

    let start = match link.read_exact(1, remaining(deadline)) {
        Ok(bytes) => bytes[0],
        Err(TransportError::Timeout { .. }) => return Err(FrameError::Timeout),
        Err(err) => return Err(short_read(Section::Start, err)),
    };
    if start != START_BYTE {
        return Err(FrameError::BadStartByte(start));
    }

    let header = read_section(link, Section::Header, HEADER_SIZE - 1, deadline)?;
    let command = header[0];
    let payload_len = u16::from_be_bytes([header[1], header[2]]) as usize;

    let payload = if payload_len == 0 {
        Bytes::new()
    } else {
        read_section(link, Section::Payload, payload_len, deadline)?
    };

    let footer = read_section(link, Section::Footer, FOOTER_SIZE, deadline)?;
    if footer[1] != END_BYTE {
        return Err(FrameError::BadEndByte(footer[1]));
    }
    let computed = checksum::compute(&payload);
    if footer[0] != computed {
        return Err(FrameError::ChecksumMismatch {
            received: footer[0],
            computed,
        });
    }

    Ok(Frame { command, payload })
}

fn read_section<L: Link + ?Sized>(
    link: &mut L,
    section: Section,
    len: usize,
    deadline: Instant,
) -> Result<Bytes> {
    link.read_exact(len, remaining(deadline))
        .map_err(|err| short_read(section, err))
}

fn short_read(section: Section, err: TransportError) -> FrameError {
    match err {
        TransportError::Timeout { expected, partial }
        | TransportError::Truncated { expected, partial } => FrameError::Truncated {
            section,
            expected,
            received: partial.len(),
        },
        other => FrameError::Transport(other),
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
