//! CRC-8 over frame payloads.
//!
//! Polynomial `x^8 + x^5 + x^4 + 1` (0x31), initial value 0xFF, no
//! reflection, no final XOR (CRC-8/NRSC-5). Only the payload is covered;
//! sentinels and header bytes are not.

const POLYNOMIAL: u8 = 0x31;
const INITIAL: u8 = 0xFF;

/// Compute the frame checksum of `payload`.
pub fn compute(payload: &[u8]) -> u8 {
    payload.iter().fold(INITIAL, |crc, &byte| update(crc, byte))
}

fn update(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ POLYNOMIAL
        } else {
            crc << 1
        };
    }
    crc
}
