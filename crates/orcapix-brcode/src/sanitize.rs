//! Input cleanup for BR Code fields
//!
//! Keys keep the shape the DICT directory expects: e-mail and random keys
//! verbatim minus whitespace, everything else digits only. Merchant name and
//! city are reduced to upper-case ASCII because several banking apps cannot
//! display anything else, and because a TLV value never exceeds 99 chars.

use once_cell::sync::Lazy;
use orcapix_core::PixKeyType;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Maximum merchant name length (field 59)
pub const NAME_MAX_LEN: usize = 25;
/// Maximum merchant city length (field 60)
pub const CITY_MAX_LEN: usize = 15;

/// Loose random-key (EVP) shape: 36 chars of hex digits and hyphens.
static RANDOM_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[0-9a-f-]{36}$").unwrap());

/// Clean a Pix key according to its type, inferring the type when absent.
///
/// Inference is best effort: a random key that does not look like a UUID and
/// carries no type hint is treated as a document/phone key and loses every
/// non-digit character.
pub fn sanitize_key(raw: &str, key_type: Option<PixKeyType>) -> String {
    if key_type == Some(PixKeyType::Email) || raw.contains('@') {
        return strip_whitespace(raw);
    }
    if key_type == Some(PixKeyType::Aleatoria) || RANDOM_KEY.is_match(raw) {
        return strip_whitespace(raw);
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if key_type.is_none() && digits.len() != raw.chars().filter(|c| !c.is_whitespace()).count() {
        tracing::debug!(
            kept = digits.len(),
            "Pix key has no type hint, keeping digits only"
        );
    }
    digits
}

/// Reduce free text to what EMV merchant fields accept.
///
/// Accented letters lose their diacritics (NFD, then marks dropped), every
/// other char outside ASCII letters, digits and whitespace is removed, the
/// result is trimmed, upper-cased and cut to `max_len` chars.
pub fn sanitize_text(raw: &str, max_len: usize) -> String {
    let mut text: String = raw
        .nfd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();

    text = text.trim().to_ascii_uppercase();
    // ASCII only from here on, byte and char counts agree
    text.truncate(max_len);
    // a cut can land right after a space
    text.truncate(text.trim_end().len());
    text
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
