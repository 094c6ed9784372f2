//! Byte-link abstraction for talking to a bridge microcontroller.
//!
//! Provides a unified blocking interface over the channels a bridge can be
//! reached through:
//! - Serial ports (USB-UART adapters, on-board UARTs)
//! - An in-memory link for tests and device simulations
//!
//! This is the lowest layer of atbridge. Framing and command dispatch build on
//! top of the [`Link`] trait provided here.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryLink;
pub use serial::{available_ports, PortInfo, SerialLink};
pub use traits::{Link, LinkConfig, DEFAULT_BAUD_RATE};
