use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Link, LinkConfig};

/// Shortest read timeout handed to the driver; bytes already buffered are
/// still collected once the deadline has passed.
const MIN_POLL: Duration = Duration::from_millis(1);

/// Serial-port link to a bridge.
///
/// Opens the port 8N1 without flow control. Opening toggles DTR on most
/// USB-UART adapters, which resets boards wired for auto-reset; the settle
/// delay from [`LinkConfig`] covers the reboot before the link is returned.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    endpoint: String,
    baud_rate: u32,
    write_timeout: Duration,
}

impl SerialLink {
    /// Open the configured endpoint and wait for the peer to settle.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(config.endpoint.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.write_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                endpoint: config.endpoint.clone(),
                source,
            })?;

        let settle = config.settle_delay();
        debug!(endpoint = %config.endpoint, ?settle, "waiting for peer to settle");
        std::thread::sleep(settle);
        port.clear(ClearBuffer::Input)?;

        info!(
            endpoint = %config.endpoint,
            baud_rate = config.baud_rate,
            "serial link open"
        );

        Ok(Self {
            port: Some(port),
            endpoint: config.endpoint.clone(),
            baud_rate: config.baud_rate,
            write_timeout: config.write_timeout,
        })
    }

    /// Bytes buffered by the driver and not yet read.
    pub fn bytes_to_read(&self) -> Result<u32> {
        match &self.port {
            Some(port) => Ok(port.bytes_to_read()?),
            None => Err(TransportError::Closed),
        }
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(TransportError::Closed)
    }
}

impl Link for SerialLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let write_timeout = self.write_timeout;
        let port = self.port_mut()?;
        port.set_timeout(write_timeout)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Bytes> {
        let port = self.port_mut()?;
        let mut buf = vec![0u8; len];
        let mut filled = 0usize;
        let deadline = Instant::now() + timeout;

        while filled < len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            port.set_timeout(remaining.max(MIN_POLL))?;
            match port.read(&mut buf[filled..]) {
                Ok(n) => filled += n,
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(err) => return Err(TransportError::Io(err)),
            }

            if filled < len && Instant::now() >= deadline {
                buf.truncate(filled);
                return Err(TransportError::Timeout {
                    expected: len,
                    partial: Bytes::from(buf),
                });
            }
        }

        Ok(Bytes::from(buf))
    }

    fn discard_pending_input(&mut self) -> Result<()> {
        let stale = self.bytes_to_read().unwrap_or(0);
        self.port_mut()?.clear(ClearBuffer::Input)?;
        if stale > 0 {
            debug!(endpoint = %self.endpoint, stale, "discarded stale input");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!(endpoint = %self.endpoint, "serial link closed");
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("endpoint", &self.endpoint)
            .field("baud_rate", &self.baud_rate)
            .field("open", &self.port.is_some())
            .finish()
    }
}

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    /// `usb`, `pci`, `bluetooth` or `unknown`.
    pub kind: &'static str,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// Enumerate serial ports on this host.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| match port.port_type {
            SerialPortType::UsbPort(usb) => PortInfo {
                name: port.port_name,
                kind: "usb",
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                manufacturer: usb.manufacturer,
                product: usb.product,
                serial_number: usb.serial_number,
            },
            other => PortInfo {
                name: port.port_name,
                kind: match other {
                    SerialPortType::PciPort => "pci",
                    SerialPortType::BluetoothPort => "bluetooth",
                    _ => "unknown",
                },
                vid: None,
                pid: None,
                manufacturer: None,
                product: None,
                serial_number: None,
            },
        })
        .collect())
}
