use std::fmt;

/// Bit the firmware sets on the command byte of every response.
pub const RESPONSE_FLAG: u8 = 0x80;

/// Peripheral group a command belongs to, by opcode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    System,
    Ethernet,
    Udp,
    Tcp,
    Rtc,
    I2c,
}

impl Subsystem {
    /// All subsystems, in opcode order.
    pub const ALL: [Subsystem; 6] = [
        Subsystem::System,
        Subsystem::Ethernet,
        Subsystem::Udp,
        Subsystem::Tcp,
        Subsystem::Rtc,
        Subsystem::I2c,
    ];

    /// The subsystem whose range contains `code`, if any.
    ///
    /// The response flag is ignored, so a response's command byte resolves to
    /// the same subsystem as its request.
    pub fn of(code: u8) -> Option<Self> {
        match code & !RESPONSE_FLAG {
            0x00..=0x0F => Some(Subsystem::System),
            0x10..=0x1F => Some(Subsystem::Ethernet),
            0x20..=0x2F => Some(Subsystem::Udp),
            0x30..=0x3F => Some(Subsystem::Tcp),
            0x40..=0x4F => Some(Subsystem::Rtc),
            0x50..=0x5F => Some(Subsystem::I2c),
            _ => None,
        }
    }

    /// First opcode of the range.
    pub fn base(self) -> u8 {
        match self {
            Subsystem::System => 0x00,
            Subsystem::Ethernet => 0x10,
            Subsystem::Udp => 0x20,
            Subsystem::Tcp => 0x30,
            Subsystem::Rtc => 0x40,
            Subsystem::I2c => 0x50,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subsystem::System => "system",
            Subsystem::Ethernet => "ethernet",
            Subsystem::Udp => "udp",
            Subsystem::Tcp => "tcp",
            Subsystem::Rtc => "rtc",
            Subsystem::I2c => "i2c",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every opcode the bridge firmware understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Ping = 0x00,
    GetVersion = 0x01,
    Reset = 0x02,
    GetStatus = 0x03,
    SetLed = 0x04,

    EthInit = 0x10,
    EthStatus = 0x11,
    EthGetMac = 0x12,
    EthSetMac = 0x13,
    EthGetIp = 0x14,
    EthSetIp = 0x15,
    EthDhcp = 0x16,
    EthLinkStatus = 0x17,

    UdpBegin = 0x20,
    UdpClose = 0x21,
    UdpSend = 0x22,
    UdpRecv = 0x23,
    UdpAvailable = 0x24,
    DnsResolve = 0x25,

    TcpConnect = 0x30,
    TcpListen = 0x31,
    TcpClose = 0x32,
    TcpSend = 0x33,
    TcpRecv = 0x34,
    TcpAvailable = 0x35,
    TcpStatus = 0x36,

    RtcGetTime = 0x40,
    RtcSetTime = 0x41,
    RtcGetDate = 0x42,
    RtcSetDate = 0x43,
    RtcGetDatetime = 0x44,
    RtcSetDatetime = 0x45,
    RtcGetTemp = 0x46,

    I2cScan = 0x50,
    I2cWrite = 0x51,
    I2cRead = 0x52,
    I2cWriteRead = 0x53,
}

impl Command {
    /// The full table, in opcode order.
    pub const ALL: [Command; 37] = [
        Command::Ping,
        Command::GetVersion,
        Command::Reset,
        Command::GetStatus,
        Command::SetLed,
        Command::EthInit,
        Command::EthStatus,
        Command::EthGetMac,
        Command::EthSetMac,
        Command::EthGetIp,
        Command::EthSetIp,
        Command::EthDhcp,
        Command::EthLinkStatus,
        Command::UdpBegin,
        Command::UdpClose,
        Command::UdpSend,
        Command::UdpRecv,
        Command::UdpAvailable,
        Command::DnsResolve,
        Command::TcpConnect,
        Command::TcpListen,
        Command::TcpClose,
        Command::TcpSend,
        Command::TcpRecv,
        Command::TcpAvailable,
        Command::TcpStatus,
        Command::RtcGetTime,
        Command::RtcSetTime,
        Command::RtcGetDate,
        Command::RtcSetDate,
        Command::RtcGetDatetime,
        Command::RtcSetDatetime,
        Command::RtcGetTemp,
        Command::I2cScan,
        Command::I2cWrite,
        Command::I2cRead,
        Command::I2cWriteRead,
    ];

    /// Wire opcode.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up an opcode. The response flag must already be stripped.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.code() == code)
    }

    /// Opcode the firmware is expected to answer with.
    pub fn response_code(self) -> u8 {
        self.code() | RESPONSE_FLAG
    }

    pub fn subsystem(self) -> Subsystem {
        match self.code() {
            0x00..=0x0F => Subsystem::System,
            0x10..=0x1F => Subsystem::Ethernet,
            0x20..=0x2F => Subsystem::Udp,
            0x30..=0x3F => Subsystem::Tcp,
            0x40..=0x4F => Subsystem::Rtc,
            _ => Subsystem::I2c,
        }
    }

    /// Upper-snake name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::GetVersion => "GET_VERSION",
            Command::Reset => "RESET",
            Command::GetStatus => "GET_STATUS",
            Command::SetLed => "SET_LED",
            Command::EthInit => "ETH_INIT",
            Command::EthStatus => "ETH_STATUS",
            Command::EthGetMac => "ETH_GET_MAC",
            Command::EthSetMac => "ETH_SET_MAC",
            Command::EthGetIp => "ETH_GET_IP",
            Command::EthSetIp => "ETH_SET_IP",
            Command::EthDhcp => "ETH_DHCP",
            Command::EthLinkStatus => "ETH_LINK_STATUS",
            Command::UdpBegin => "UDP_BEGIN",
            Command::UdpClose => "UDP_CLOSE",
            Command::UdpSend => "UDP_SEND",
            Command::UdpRecv => "UDP_RECV",
            Command::UdpAvailable => "UDP_AVAILABLE",
            Command::DnsResolve => "DNS_RESOLVE",
            Command::TcpConnect => "TCP_CONNECT",
            Command::TcpListen => "TCP_LISTEN",
            Command::TcpClose => "TCP_CLOSE",
            Command::TcpSend => "TCP_SEND",
            Command::TcpRecv => "TCP_RECV",
            Command::TcpAvailable => "TCP_AVAILABLE",
            Command::TcpStatus => "TCP_STATUS",
            Command::RtcGetTime => "RTC_GET_TIME",
            Command::RtcSetTime => "RTC_SET_TIME",
            Command::RtcGetDate => "RTC_GET_DATE",
            Command::RtcSetDate => "RTC_SET_DATE",
            Command::RtcGetDatetime => "RTC_GET_DATETIME",
            Command::RtcSetDatetime => "RTC_SET_DATETIME",
            Command::RtcGetTemp => "RTC_GET_TEMP",
            Command::I2cScan => "I2C_SCAN",
            Command::I2cWrite => "I2C_WRITE",
            Command::I2cRead => "I2C_READ",
            Command::I2cWriteRead => "I2C_WRITE_READ",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd.code()
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Self::from_code(code).ok_or(code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}
