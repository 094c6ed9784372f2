use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Years the RTC can hold (stored as an offset from 2000).
const RTC_YEARS: std::ops::RangeInclusive<u16> = 2000..=2099;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Firmware version reported by `GET_VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Snapshot reported by `GET_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub eth_initialized: bool,
    pub eth_link_up: bool,
    pub rtc_present: bool,
    pub uptime_hours: u8,
    pub uptime_minutes: u8,
    pub uptime_seconds: u8,
    /// Free RAM on the bridge, in bytes.
    pub free_ram: u16,
}

impl SystemStatus {
    /// Uptime as a duration. The hour counter wraps at 255 on the device.
    pub fn uptime(&self) -> Duration {
        Duration::from_secs(
            u64::from(self.uptime_hours) * 3600
                + u64::from(self.uptime_minutes) * 60
                + u64::from(self.uptime_seconds),
        )
    }
}

/// 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in &mut octets {
            let part = parts
                .next()
                .ok_or_else(|| format!("invalid MAC address: {s}"))?;
            if part.len() != 2 {
                return Err(format!("invalid MAC address: {s}"));
            }
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| format!("invalid MAC address: {s}"))?;
        }
        if parts.next().is_some() {
            return Err(format!("invalid MAC address: {s}"));
        }
        Ok(Self(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Static IPv4 configuration, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpConfig {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub dns: Ipv4Addr,
}

impl IpConfig {
    pub(crate) const WIRE_SIZE: usize = 16;

    pub(crate) fn to_wire(self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.ip.octets());
        out[4..8].copy_from_slice(&self.gateway.octets());
        out[8..12].copy_from_slice(&self.subnet.octets());
        out[12..16].copy_from_slice(&self.dns.octets());
        out
    }
}

/// One datagram returned by `UDP_RECV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDatagram {
    pub source: SocketAddrV4,
    pub data: Bytes,
}

/// Wall-clock time on the bridge RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let (hour, minute, second) = (self.hour, self.minute, self.second);
        NaiveTime::from_hms_opt(hour.into(), minute.into(), second.into())
            .map(|_| ())
            .ok_or_else(|| format!("time out of range: {self}"))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Calendar date on the bridge RTC.
///
/// The RTC stores the year as an offset from 2000 and the weekday as 1..=7
/// with 1 meaning Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
}

impl Date {
    /// The RTC's date for a calendar day; the weekday is derived.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, String> {
        let date = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
            .ok_or_else(|| format!("no such date: {year:04}-{month:02}-{day:02}"))?;
        Self::try_from(date)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        NaiveDate::try_from(*self)?;
        if !(1..=7).contains(&self.weekday) {
            return Err(format!("weekday {} outside 1..=7", self.weekday));
        }
        Ok(())
    }

    pub(crate) fn year_offset(&self) -> u8 {
        (self.year - 2000) as u8
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = String;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = u16::try_from(date.year())
            .ok()
            .filter(|year| RTC_YEARS.contains(year))
            .ok_or_else(|| format!("year {} outside 2000..=2099", date.year()))?;
        Ok(Self {
            year,
            month: date.month() as u8,
            day: date.day() as u8,
            weekday: date.weekday().number_from_sunday() as u8,
        })
    }
}

impl TryFrom<Date> for NaiveDate {
    type Error = String;

    /// Checks the calendar fields; the weekday is ignored.
    fn try_from(date: Date) -> Result<Self, Self::Error> {
        if !RTC_YEARS.contains(&date.year) {
            return Err(format!("year {} outside 2000..=2099", date.year));
        }
        NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
            .ok_or_else(|| format!("no such date: {date}"))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Date and time on the bridge RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateTime {
    pub date: Date,
    pub time: TimeOfDay,
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = String;

    /// Sub-second precision is dropped.
    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        Ok(Self {
            date: Date::try_from(value.date())?,
            time: TimeOfDay {
                hour: value.hour() as u8,
                minute: value.minute() as u8,
                second: value.second() as u8,
            },
        })
    }
}

impl TryFrom<DateTime> for NaiveDateTime {
    type Error = String;

    fn try_from(value: DateTime) -> Result<Self, Self::Error> {
        let TimeOfDay {
            hour,
            minute,
            second,
        } = value.time;
        NaiveDate::try_from(value.date)?
            .and_hms_opt(hour.into(), minute.into(), second.into())
            .ok_or_else(|| format!("time out of range: {}", value.time))
    }
}

impl FromStr for DateTime {
    type Err = String;

    /// Parses `YYYY-MM-DD HH:MM:SS` (or with a `T` separator). The weekday
    /// is derived from the date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM:SS, got {s:?}"))?;
        Self::try_from(parsed)
    }
}

/// W5500 socket status register value reported by `TCP_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpState(pub u8);

impl TcpState {
    pub const CLOSED: TcpState = TcpState(0x00);
    pub const INIT: TcpState = TcpState(0x13);
    pub const LISTEN: TcpState = TcpState(0x14);
    pub const ESTABLISHED: TcpState = TcpState(0x17);
    pub const CLOSE_WAIT: TcpState = TcpState(0x1C);

    pub fn is_established(self) -> bool {
        self == Self::ESTABLISHED
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0x00 => "CLOSED",
            0x13 => "INIT",
            0x14 => "LISTEN",
            0x15 => "SYN_SENT",
            0x16 => "SYN_RECV",
            0x17 => "ESTABLISHED",
            0x18 => "FIN_WAIT",
            0x1A => "CLOSING",
            0x1B => "TIME_WAIT",
            0x1C => "CLOSE_WAIT",
            0x1D => "LAST_ACK",
            0x22 => "UDP",
            0x42 => "MACRAW",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.0)
    }
}

impl Serialize for TcpState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
