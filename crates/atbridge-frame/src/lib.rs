//! Checksummed command framing for the bridge serial protocol.
//!
//! Every message on the wire is one frame:
//! - A start sentinel (`0xAA`)
//! - A 1-byte command opcode
//! - A 2-byte big-endian payload length
//! - The payload, a CRC-8 over the payload, and an end sentinel (`0x55`)
//!
//! Decoding is strict: a bad sentinel or checksum is an error, never a
//! silent resynchronization.

pub mod checksum;
pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod status;
pub mod writer;

pub use codec::{
    decode_frame, encode, encode_frame, Frame, END_BYTE, FOOTER_SIZE, HEADER_SIZE, MAX_PAYLOAD,
    MIN_FRAME_SIZE, START_BYTE,
};
pub use command::{Command, Subsystem, RESPONSE_FLAG};
pub use error::{FrameError, Result, Section};
pub use reader::read_frame;
pub use status::Status;
pub use writer::write_frame;
