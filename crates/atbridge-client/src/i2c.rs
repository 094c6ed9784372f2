use atbridge_frame::Command;
use atbridge_transport::Link;
use bytes::{BufMut, Bytes, BytesMut};

use crate::client::BridgeClient;
use crate::error::{OpResult, OperationError};

/// Largest write the bridge's I2C buffer accepts.
pub const MAX_WRITE: usize = 30;

/// Largest read the bridge's I2C buffer accepts.
pub const MAX_READ: usize = 32;

/// 7-bit addresses only.
const MAX_ADDRESS: u8 = 0x7F;

/// Raw I2C bus access.
pub struct I2c<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> I2c<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    /// Addresses that acknowledged, in bus order.
    pub fn scan(&mut self) -> OpResult<Vec<u8>> {
        let mut resp = self.client.call(Command::I2cScan, &[], None)?;
        let count = resp.u8()?;
        Ok(resp.take(usize::from(count))?.to_vec())
    }

    pub fn write(&mut self, address: u8, data: &[u8]) -> OpResult<()> {
        check_address(address)?;
        check_len("write", data.len(), MAX_WRITE)?;
        let mut req = BytesMut::with_capacity(2 + data.len());
        req.put_u8(address);
        req.put_u8(data.len() as u8);
        req.put_slice(data);
        self.client.call(Command::I2cWrite, &req, None)?;
        Ok(())
    }

    pub fn read(&mut self, address: u8, len: usize) -> OpResult<Bytes> {
        check_address(address)?;
        check_len("read", len, MAX_READ)?;
        let mut resp = self
            .client
            .call(Command::I2cRead, &[address, len as u8], None)?;
        resp.take(len)
    }

    /// Write then read without releasing the bus (register reads).
    pub fn write_read(&mut self, address: u8, data: &[u8], read_len: usize) -> OpResult<Bytes> {
        check_address(address)?;
        check_len("write", data.len(), MAX_WRITE)?;
        check_len("read", read_len, MAX_READ)?;
        let mut req = BytesMut::with_capacity(3 + data.len());
        req.put_u8(address);
        req.put_u8(data.len() as u8);
        req.put_slice(data);
        req.put_u8(read_len as u8);
        let mut resp = self.client.call(Command::I2cWriteRead, &req, None)?;
        resp.take(read_len)
    }
}

fn check_address(address: u8) -> OpResult<()> {
    if address > MAX_ADDRESS {
        return Err(OperationError::invalid(format!(
            "I2C address 0x{address:02X} is not a 7-bit address"
        )));
    }
    Ok(())
}

fn check_len(what: &str, len: usize, max: usize) -> OpResult<()> {
    if len == 0 || len > max {
        return Err(OperationError::invalid(format!(
            "I2C {what} length {len} outside 1..={max}"
        )));
    }
    Ok(())
}
