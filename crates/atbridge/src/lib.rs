//! Host-side client for microcontroller serial bridges.
//!
//! A bridge exposes Ethernet, UDP, TCP, RTC and I2C peripherals over a
//! checksummed request/response protocol on a serial line.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte links (serial port, in-memory test double)
//! - [`frame`]: wire framing, checksum, command and status tables
//! - [`client`]: the transaction client and typed subsystem operations

/// Re-export transport types.
pub mod transport {
    pub use atbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use atbridge_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use atbridge_client::*;
}

pub use atbridge_client::{BridgeClient, BridgeError, ClientConfig, OperationError, SharedClient};
pub use atbridge_transport::LinkConfig;
