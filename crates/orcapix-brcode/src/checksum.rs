//! CRC16/CCITT-FALSE (poly 0x1021, init 0xFFFF, no reflection, no final XOR)
//!
//! EMV QR payloads checksum the text one byte per character. Callers pass
//! sanitized ASCII in practice; anything wider is masked to its low 8 bits,
//! one UTF-16 code unit at a time, which is what the quoting app has always
//! emitted for non-ASCII e-mail keys.

use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/IBM-3740 is the catalogue name for CCITT-FALSE.
const CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Checksum `text` as one byte per UTF-16 code unit.
pub fn crc16(text: &str) -> u16 {
    if text.is_ascii() {
        return CCITT_FALSE.checksum(text.as_bytes());
    }
    let bytes: Vec<u8> = text.encode_utf16().map(|unit| (unit & 0xFF) as u8).collect();
    CCITT_FALSE.checksum(&bytes)
}

/// Checksum formatted the way field 63 carries it: 4 uppercase hex digits.
pub fn crc16_hex(text: &str) -> String {
    format!("{:04X}", crc16(text))
}
