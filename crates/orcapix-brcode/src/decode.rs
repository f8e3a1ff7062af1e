//! BR Code verification and decoding
//!
//! Accepts payloads from any issuer, not only the ones `assemble_payload`
//! builds: optional fields such as 01 (initiation method) and 54 (amount)
//! are reported when present, unknown tags are skipped.

use orcapix_core::{OrcapixError, OrcapixResult};
use serde::Serialize;
use tracing::debug;

use crate::checksum::crc16_hex;
use crate::payload::{tags, PIX_GUI};
use crate::tlv::{TlvField, TlvReader};

/// Top-level fields every static Pix BR Code carries
const REQUIRED: [&str; 7] = [
    tags::PAYLOAD_FORMAT,
    tags::MERCHANT_ACCOUNT,
    tags::MERCHANT_CATEGORY,
    tags::CURRENCY,
    tags::COUNTRY,
    tags::MERCHANT_NAME,
    tags::MERCHANT_CITY,
];

/// Fields of a decoded static Pix BR Code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrCode {
    pub payload_format: String,
    pub initiation_method: Option<String>,
    pub gui: String,
    pub key: String,
    pub merchant_category: String,
    pub currency: String,
    pub amount: Option<String>,
    pub country: String,
    pub merchant_name: String,
    pub merchant_city: String,
    pub txid: Option<String>,
    pub crc: String,
}

/// Check the trailing `6304XXXX` field against the rest of the payload.
///
/// Hex digits are compared case-insensitively.
pub fn verify_crc(payload: &str) -> OrcapixResult<()> {
    let split = payload
        .len()
        .checked_sub(4)
        .filter(|&at| at >= 4 && payload.is_char_boundary(at))
        .ok_or(OrcapixError::MissingField(tags::CRC))?;
    let (body, carried) = payload.split_at(split);
    if !body.ends_with("6304") {
        return Err(OrcapixError::MissingField(tags::CRC));
    }

    let computed = crc16_hex(body);
    if !carried.eq_ignore_ascii_case(&computed) {
        return Err(OrcapixError::CrcMismatch {
            expected: carried.to_ascii_uppercase(),
            computed,
        });
    }
    Ok(())
}

/// Verify and decode a BR Code into its fields.
pub fn decode_payload(payload: &str) -> OrcapixResult<BrCode> {
    verify_crc(payload)?;

    let mut code = BrCode::default();
    let mut seen = Vec::with_capacity(REQUIRED.len() + 2);

    for field in TlvReader::new(payload) {
        let TlvField { tag, value } = field?;
        seen.push(tag);
        match tag {
            tags::PAYLOAD_FORMAT => code.payload_format = value.to_string(),
            tags::INITIATION_METHOD => code.initiation_method = Some(value.to_string()),
            tags::MERCHANT_ACCOUNT => {
                for sub in TlvReader::new(value) {
                    let sub = sub?;
                    match sub.tag {
                        tags::GUI => code.gui = sub.value.to_string(),
                        tags::KEY => code.key = sub.value.to_string(),
                        _ => debug!(tag = sub.tag, "skipping merchant account subfield"),
                    }
                }
            }
            tags::MERCHANT_CATEGORY => code.merchant_category = value.to_string(),
            tags::CURRENCY => code.currency = value.to_string(),
            tags::AMOUNT => code.amount = Some(value.to_string()),
            tags::COUNTRY => code.country = value.to_string(),
            tags::MERCHANT_NAME => code.merchant_name = value.to_string(),
            tags::MERCHANT_CITY => code.merchant_city = value.to_string(),
            tags::ADDITIONAL_DATA => {
                for sub in TlvReader::new(value) {
                    let sub = sub?;
                    if sub.tag == tags::TXID {
                        code.txid = Some(sub.value.to_string());
                    }
                }
            }
            tags::CRC => code.crc = value.to_ascii_uppercase(),
            _ => debug!(tag, "skipping unknown field"),
        }
    }

    if let Some(missing) = REQUIRED.into_iter().find(|tag| !seen.contains(tag)) {
        return Err(OrcapixError::MissingField(missing));
    }
    if !code.gui.eq_ignore_ascii_case(PIX_GUI) {
        return Err(OrcapixError::Tlv(format!(
            "field 26 carries GUI '{}', not a Pix arrangement",
            code.gui
        )));
    }
    if code.key.is_empty() {
        return Err(OrcapixError::MissingField("26.01"));
    }

    debug!(key = %code.key, crc = %code.crc, "decoded BR Code");
    Ok(code)
}
