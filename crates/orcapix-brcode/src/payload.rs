//! Static Pix charge assembly
//!
//! Produces an open-amount BR Code: no field 54, so the payer types the
//! value in their banking app. Field order is fixed:
//! `00 26 52 53 58 59 60 62 63`.

use orcapix_core::{OrcapixError, OrcapixResult, PixKeyInput};
use tracing::{debug, warn};

use crate::checksum::crc16_hex;
use crate::sanitize::{sanitize_key, sanitize_text, CITY_MAX_LEN, NAME_MAX_LEN};
use crate::tlv::{value_len, write_field, MAX_VALUE_LEN};

/// Top-level and nested tag numbers used by static Pix charges
pub mod tags {
    pub const PAYLOAD_FORMAT: &str = "00";
    pub const INITIATION_METHOD: &str = "01";
    pub const MERCHANT_ACCOUNT: &str = "26";
    pub const MERCHANT_CATEGORY: &str = "52";
    pub const CURRENCY: &str = "53";
    pub const AMOUNT: &str = "54";
    pub const COUNTRY: &str = "58";
    pub const MERCHANT_NAME: &str = "59";
    pub const MERCHANT_CITY: &str = "60";
    pub const ADDITIONAL_DATA: &str = "62";
    pub const CRC: &str = "63";

    /// Inside field 26
    pub const GUI: &str = "00";
    pub const KEY: &str = "01";

    /// Inside field 62
    pub const TXID: &str = "05";
}

/// Pix arrangement identifier (field 26, subfield 00)
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";
pub const PAYLOAD_FORMAT_VERSION: &str = "01";
/// Unspecified merchant category
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
/// ISO 4217 numeric code for BRL
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_CODE: &str = "BR";
/// Transaction id meaning "no reference supplied"
pub const NO_TXID: &str = "***";

pub const FALLBACK_NAME: &str = "RECEBEDOR";
pub const FALLBACK_CITY: &str = "SAO PAULO";

/// CRC field header: tag 63, fixed length 04
const CRC_HEADER: &str = "6304";

/// Longest key that still fits field 26 next to the GUI subfield
pub const MAX_KEY_LEN: usize = MAX_VALUE_LEN - (4 + PIX_GUI.len()) - 4;

/// Assemble the BR Code for an open-amount Pix charge.
///
/// Fails with [`OrcapixError::InvalidPixKey`] when the key is empty after
/// sanitization, or too long for a BR Code to carry. Nothing else fails.
pub fn assemble_payload(input: &PixKeyInput) -> OrcapixResult<String> {
    let key = sanitize_key(&input.key, input.key_type);

    let mut name = sanitize_text(&input.name, NAME_MAX_LEN);
    if name.is_empty() {
        warn!("merchant name empty after sanitizing, using {FALLBACK_NAME}");
        name = FALLBACK_NAME.to_string();
    }

    let city = match input.city.as_deref() {
        Some(raw) if !raw.is_empty() => sanitize_text(raw, CITY_MAX_LEN),
        _ => FALLBACK_CITY.to_string(),
    };

    if key.is_empty() {
        return Err(OrcapixError::InvalidPixKey("Pix key is required".into()));
    }
    let key_len = value_len(&key);
    if key_len > MAX_KEY_LEN {
        return Err(OrcapixError::InvalidPixKey(format!(
            "key is {key_len} chars, a BR Code holds at most {MAX_KEY_LEN}"
        )));
    }

    let mut account = String::with_capacity(8 + PIX_GUI.len() + key.len());
    write_field(&mut account, tags::GUI, PIX_GUI)?;
    write_field(&mut account, tags::KEY, &key)?;

    let mut additional = String::with_capacity(7);
    write_field(&mut additional, tags::TXID, NO_TXID)?;

    let mut payload = String::with_capacity(128 + key.len());
    write_field(&mut payload, tags::PAYLOAD_FORMAT, PAYLOAD_FORMAT_VERSION)?;
    write_field(&mut payload, tags::MERCHANT_ACCOUNT, &account)?;
    write_field(&mut payload, tags::MERCHANT_CATEGORY, MERCHANT_CATEGORY_CODE)?;
    write_field(&mut payload, tags::CURRENCY, CURRENCY_BRL)?;
    write_field(&mut payload, tags::COUNTRY, COUNTRY_CODE)?;
    write_field(&mut payload, tags::MERCHANT_NAME, &name)?;
    write_field(&mut payload, tags::MERCHANT_CITY, &city)?;
    write_field(&mut payload, tags::ADDITIONAL_DATA, &additional)?;

    payload.push_str(CRC_HEADER);
    let crc = crc16_hex(&payload);
    payload.push_str(&crc);

    debug!(
        key_type = ?input.key_type,
        len = payload.len(),
        crc = %crc,
        "assembled BR Code"
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orcapix_core::PixKeyType;

    #[test]
    fn blank_key_is_rejected() {
        let input = PixKeyInput::new("   ", "Jane").with_city("SP");
        let err = assemble_payload(&input).unwrap_err();
        assert!(err.is_invalid_key(), "got {err:?}");
    }

    #[test]
    fn key_stripped_to_nothing_is_rejected() {
        let input = PixKeyInput::new("(--)", "Jane").with_key_type(PixKeyType::Telefone);
        assert!(assemble_payload(&input).unwrap_err().is_invalid_key());
    }

    #[test]
    fn fallback_name_and_city() {
        let payload = assemble_payload(&PixKeyInput::new("a@b.com", "")).unwrap();
        assert_eq!(
            payload,
            "00020126290014BR.GOV.BCB.PIX0107a@b.com5204000053039865802BR\
             5909RECEBEDOR6009SAO PAULO62070503***63041F25"
        );
    }

    #[test]
    fn empty_city_uses_fallback() {
        let input = PixKeyInput::new("a@b.com", "").with_city("");
        let payload = assemble_payload(&input).unwrap();
        assert!(payload.contains("6009SAO PAULO"));
    }

    #[test]
    fn city_of_symbols_stays_empty() {
        // only a missing/empty city falls back; a sanitized-away one does not
        let input = PixKeyInput::new("a@b.com", "Loja").with_city("???");
        let payload = assemble_payload(&input).unwrap();
        assert!(payload.contains("600062070503***"));
    }

    #[test]
    fn phone_key_end_to_end() {
        let input = PixKeyInput::new("11999998888", "João da Silva")
            .with_city("São Paulo")
            .with_key_type(PixKeyType::Telefone);
        let payload = assemble_payload(&input).unwrap();
        assert_eq!(
            payload,
            "00020126330014BR.GOV.BCB.PIX011111999998888520400005303986\
             5802BR5913JOAO DA SILVA6009SAO PAULO62070503***6304792E"
        );
    }

    #[test]
    fn random_key_is_embedded_verbatim() {
        let input = PixKeyInput::new("123e4567-e89b-12d3-a456-426614174000", "Loja do Zé")
            .with_city("Recife");
        let payload = assemble_payload(&input).unwrap();
        assert_eq!(
            payload,
            "00020126580014BR.GOV.BCB.PIX0136123e4567-e89b-12d3-a456-426614174000\
             5204000053039865802BR5910LOJA DO ZE6006RECIFE62070503***6304770C"
        );
    }

    #[test]
    fn never_emits_amount() {
        let payload = assemble_payload(&PixKeyInput::new("12345678901", "Jane")).unwrap();
        assert!(!payload.contains("530398654"));
    }

    #[test]
    fn longest_key_fits_one_more_does_not() {
        let local = "a".repeat(MAX_KEY_LEN - "@x.io".len());
        let key = format!("{local}@x.io");
        let payload = assemble_payload(&PixKeyInput::new(key.as_str(), "Jane")).unwrap();
        assert!(payload.starts_with("0002012699"));

        let too_long = format!("a{key}");
        let err = assemble_payload(&PixKeyInput::new(too_long, "Jane")).unwrap_err();
        assert!(err.is_invalid_key());
    }
}
