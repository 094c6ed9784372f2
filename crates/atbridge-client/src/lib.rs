//! Command client for the bridge serial protocol.
//!
//! [`BridgeClient`] owns one link and runs one request/response transaction
//! at a time. The subsystem facades ([`System`], [`Ethernet`], [`Udp`],
//! [`Tcp`], [`Rtc`], [`I2c`]) build the request layouts and turn response
//! payloads into typed values.

pub mod client;
pub mod error;
pub mod ethernet;
pub mod i2c;
mod response;
pub mod rtc;
pub mod shared;
pub mod system;
pub mod tcp;
pub mod types;
pub mod udp;

pub use client::{BridgeClient, ClientConfig, SessionState, DEFAULT_TIMEOUT};
pub use error::{BridgeError, OpResult, OperationError, Result};
pub use ethernet::Ethernet;
pub use i2c::I2c;
pub use rtc::Rtc;
pub use shared::SharedClient;
pub use system::System;
pub use tcp::Tcp;
pub use types::{
    Date, DateTime, FirmwareVersion, IpConfig, MacAddress, SystemStatus, TcpState, TimeOfDay,
    UdpDatagram,
};
pub use udp::Udp;
