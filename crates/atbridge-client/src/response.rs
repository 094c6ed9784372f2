use std::net::Ipv4Addr;

use atbridge_frame::{Command, Status};
use bytes::{Buf, Bytes};

use crate::error::{OpResult, OperationError};

/// A response payload whose status byte has been checked.
///
/// Accessors read big-endian fields in order and fail with
/// `ShortResponse` when the payload runs out.
#[derive(Debug)]
pub(crate) struct Response {
    command: Command,
    body: Bytes,
    total: usize,
}

impl Response {
    pub(crate) fn parse(command: Command, mut payload: Bytes) -> OpResult<Self> {
        let total = payload.len();
        if payload.is_empty() {
            return Err(OperationError::ShortResponse {
                command,
                expected: 1,
                actual: 0,
            });
        }
        let status = Status::from_byte(payload.get_u8());
        if !status.is_ok() {
            return Err(OperationError::Device { command, status });
        }
        Ok(Self {
            command,
            body: payload,
            total,
        })
    }

    /// Fail unless at least `len` more bytes remain.
    pub(crate) fn require(&self, len: usize) -> OpResult<()> {
        if self.body.remaining() < len {
            return Err(OperationError::ShortResponse {
                command: self.command,
                expected: self.total - self.body.remaining() + len,
                actual: self.total,
            });
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self) -> OpResult<u8> {
        self.require(1)?;
        Ok(self.body.get_u8())
    }

    pub(crate) fn flag(&mut self) -> OpResult<bool> {
        Ok(self.u8()? != 0)
    }

    pub(crate) fn u16(&mut self) -> OpResult<u16> {
        self.require(2)?;
        Ok(self.body.get_u16())
    }

    pub(crate) fn array<const N: usize>(&mut self) -> OpResult<[u8; N]> {
        self.require(N)?;
        let mut out = [0u8; N];
        self.body.copy_to_slice(&mut out);
        Ok(out)
    }

    pub(crate) fn ipv4(&mut self) -> OpResult<Ipv4Addr> {
        Ok(Ipv4Addr::from(self.array::<4>()?))
    }

    pub(crate) fn take(&mut self, len: usize) -> OpResult<Bytes> {
        self.require(len)?;
        Ok(self.body.split_to(len))
    }

    /// Everything not yet read.
    pub(crate) fn rest(self) -> Bytes {
        self.body
    }
}
