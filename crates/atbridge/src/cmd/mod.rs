use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use atbridge_client::{BridgeClient, ClientConfig, DateTime};
use atbridge_transport::{LinkConfig, DEFAULT_BAUD_RATE};
use clap::{Args, Subcommand};

use crate::exit::{bridge_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod dns;
pub mod eth;
pub mod i2c;
pub mod ports;
pub mod rtc;
pub mod system;
pub mod tcp;
pub mod udp;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the bridge answers.
    Ping,
    /// Show the bridge firmware version.
    Firmware,
    /// Show bridge status (peripherals, uptime, free RAM).
    Status,
    /// Show (and optionally bring up) the Ethernet interface.
    Eth(EthArgs),
    /// Send one UDP datagram through the bridge.
    UdpSend(UdpSendArgs),
    /// Resolve a hostname using the bridge's DNS server.
    Dns(DnsArgs),
    /// Show the state of a TCP socket.
    TcpStatus(TcpStatusArgs),
    /// Read or set the real-time clock.
    #[command(subcommand)]
    Rtc(RtcCommand),
    /// List devices on the I2C bus.
    I2cScan,
    /// Run a scripted health check against the bridge.
    Check(CheckArgs),
    /// List serial ports on this host.
    Ports,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ping => system::ping(link, format),
        Command::Firmware => system::firmware(link, format),
        Command::Status => system::status(link, format),
        Command::Eth(args) => eth::run(args, link, format),
        Command::UdpSend(args) => udp::run(args, link, format),
        Command::Dns(args) => dns::run(args, link, format),
        Command::TcpStatus(args) => tcp::run(args, link, format),
        Command::Rtc(command) => rtc::run(command, link, format),
        Command::I2cScan => i2c::run(link, format),
        Command::Check(args) => check::run(args, link, format),
        Command::Ports => ports::run(format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the bridge. Shared by every device command.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial device of the bridge.
    #[arg(
        long,
        short = 'p',
        env = "ATBRIDGE_PORT",
        default_value = "/dev/ttyUSB0",
        global = true
    )]
    pub port: String,

    /// Serial bit rate.
    #[arg(long, env = "ATBRIDGE_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,

    /// Skip the boot settle delay (the bridge does not reset when the port opens).
    #[arg(long, global = true)]
    pub no_boot_wait: bool,

    /// Transaction timeout (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s", global = true)]
    pub timeout: String,
}

impl LinkArgs {
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            baud_rate: self.baud,
            wait_for_boot: !self.no_boot_wait,
            ..LinkConfig::new(self.port.as_str())
        }
    }

    /// Open the port and wrap it in a client.
    pub fn connect(&self) -> CliResult<BridgeClient> {
        let config = ClientConfig {
            default_timeout: parse_duration(&self.timeout)?,
        };
        BridgeClient::open(&self.link_config(), config)
            .map_err(|err| bridge_error(&format!("open {}", self.port), err))
    }
}

#[derive(Args, Debug)]
pub struct EthArgs {
    /// Bring the interface up first (DHCP unless --ip is given).
    #[arg(long)]
    pub init: bool,
    /// Static address; requires --gateway, --subnet and --dns.
    #[arg(
        long,
        requires = "init",
        requires = "gateway",
        requires = "subnet",
        requires = "dns"
    )]
    pub ip: Option<Ipv4Addr>,
    #[arg(long, requires = "ip")]
    pub gateway: Option<Ipv4Addr>,
    #[arg(long, requires = "ip")]
    pub subnet: Option<Ipv4Addr>,
    #[arg(long, requires = "ip")]
    pub dns: Option<Ipv4Addr>,
}

#[derive(Args, Debug)]
pub struct UdpSendArgs {
    /// Destination as IP:PORT.
    pub dest: SocketAddrV4,
    /// Payload text.
    pub data: String,
    /// Bridge socket to use.
    #[arg(long, default_value_t = 0)]
    pub socket: u8,
    /// Local port to bind. Default: the destination port.
    #[arg(long)]
    pub local_port: Option<u16>,
    /// Wait up to --timeout for one datagram back and print it.
    #[arg(long)]
    pub reply: bool,
}

#[derive(Args, Debug)]
pub struct DnsArgs {
    /// Hostname to resolve (at most 63 characters).
    pub hostname: String,
}

#[derive(Args, Debug)]
pub struct TcpStatusArgs {
    /// Bridge socket to inspect.
    #[arg(long, default_value_t = 0)]
    pub socket: u8,
}

#[derive(Subcommand, Debug)]
pub enum RtcCommand {
    /// Read the current date and time.
    Get,
    /// Set the date and time.
    Set(RtcSetArgs),
}

#[derive(Args, Debug)]
pub struct RtcSetArgs {
    /// Date and time as "YYYY-MM-DD HH:MM:SS".
    #[arg(required_unless_present = "now", conflicts_with = "now")]
    pub datetime: Option<DateTime>,
    /// Use the host clock (UTC).
    #[arg(long)]
    pub now: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Skip the Ethernet and DNS checks.
    #[arg(long)]
    pub skip_network: bool,
    /// Hostname for the DNS check.
    #[arg(long, default_value = "example.com")]
    pub dns_host: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
        assert_eq!(parse_duration("-1s").unwrap_err().code, USAGE);
    }

    #[test]
    fn link_config_from_args() {
        let args = LinkArgs {
            port: "/dev/ttyACM1".into(),
            baud: 57_600,
            no_boot_wait: true,
            timeout: "1s".into(),
        };
        let config = args.link_config();
        assert_eq!(config.endpoint, "/dev/ttyACM1");
        assert_eq!(config.baud_rate, 57_600);
        assert!(!config.wait_for_boot);
    }
}
