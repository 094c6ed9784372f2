use std::fmt;

/// Leading status byte of every response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Error,
    UnknownCommand,
    InvalidParam,
    Timeout,
    Busy,
    NotInitialized,
    /// Ethernet cable or PHY link is down.
    NoLink,
    /// Nothing to read (UDP/TCP receive).
    NoData,
    BufferFull,
    /// The firmware rejected the request checksum.
    CrcError,
    /// A code this library does not know about.
    Other(u8),
}

impl Status {
    pub fn from_byte(code: u8) -> Self {
        match code {
            0x00 => Status::Ok,
            0x01 => Status::Error,
            0x02 => Status::UnknownCommand,
            0x03 => Status::InvalidParam,
            0x04 => Status::Timeout,
            0x05 => Status::Busy,
            0x06 => Status::NotInitialized,
            0x07 => Status::NoLink,
            0x08 => Status::NoData,
            0x09 => Status::BufferFull,
            0x0A => Status::CrcError,
            other => Status::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Status::Ok => 0x00,
            Status::Error => 0x01,
            Status::UnknownCommand => 0x02,
            Status::InvalidParam => 0x03,
            Status::Timeout => 0x04,
            Status::Busy => 0x05,
            Status::NotInitialized => 0x06,
            Status::NoLink => 0x07,
            Status::NoData => 0x08,
            Status::BufferFull => 0x09,
            Status::CrcError => 0x0A,
            Status::Other(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Error => "ERROR",
            Status::UnknownCommand => "UNKNOWN_CMD",
            Status::InvalidParam => "INVALID_PARAM",
            Status::Timeout => "TIMEOUT",
            Status::Busy => "BUSY",
            Status::NotInitialized => "NOT_INIT",
            Status::NoLink => "NO_LINK",
            Status::NoData => "NO_DATA",
            Status::BufferFull => "BUFFER_FULL",
            Status::CrcError => "CRC_ERROR",
            Status::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        Status::from_byte(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_round_trips() {
        for code in 0..=u8::MAX {
            assert_eq!(Status::from_byte(code).code(), code);
        }
    }

    #[test]
    fn known_codes() {
        assert!(Status::from_byte(0x00).is_ok());
        assert_eq!(Status::from_byte(0x06), Status::NotInitialized);
        assert_eq!(Status::from_byte(0x0A), Status::CrcError);
        assert_eq!(Status::from_byte(0x42), Status::Other(0x42));
        assert!(!Status::Busy.is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(Status::InvalidParam.to_string(), "INVALID_PARAM (0x03)");
        assert_eq!(Status::Other(0xEE).to_string(), "UNKNOWN (0xEE)");
    }
}
