//! orcapix-brcode: Pix BR Code payloads (EMV QR Code, merchant-presented mode)
//!
//! # Overview
//! - `checksum`: CRC16/CCITT-FALSE checksum closing every payload (field 63)
//! - `sanitize`: Pix key cleanup and EMV-safe merchant name/city text
//! - `tlv`: two-digit tag / two-digit length field codec
//! - `payload`: open-amount charge assembly from a receiver profile
//! - `decode`: CRC verification and field extraction for existing payloads

pub mod checksum;
pub mod decode;
pub mod payload;
pub mod sanitize;
pub mod tlv;

pub use checksum::{crc16, crc16_hex};
pub use decode::{decode_payload, verify_crc, BrCode};
pub use payload::assemble_payload;
pub use sanitize::{sanitize_key, sanitize_text, CITY_MAX_LEN, NAME_MAX_LEN};
pub use tlv::{encode_field, TlvField, TlvReader};
