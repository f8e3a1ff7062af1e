//! EMV TLV codec: `TT LL VALUE`, tag and length as two decimal digits
//!
//! Lengths count UTF-16 code units, the same unit the checksum consumes, so
//! the two stay consistent for the rare non-ASCII e-mail key. For the ASCII
//! payloads produced by the assembler this is simply the byte count.

use orcapix_core::{OrcapixError, OrcapixResult};

/// Largest value a two-digit length prefix can describe
pub const MAX_VALUE_LEN: usize = 99;

/// A single decoded field, borrowing from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvField<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

/// Length of `value` as written in the length prefix.
pub fn value_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Encode one field as `tag + LL + value`.
pub fn encode_field(tag: &str, value: &str) -> OrcapixResult<String> {
    let mut out = String::with_capacity(4 + value.len());
    write_field(&mut out, tag, value)?;
    Ok(out)
}

/// Append one encoded field to `out`. Nothing is written on error.
pub fn write_field(out: &mut String, tag: &str, value: &str) -> OrcapixResult<()> {
    if !is_two_digits(tag) {
        return Err(OrcapixError::Tlv(format!("tag '{tag}' is not two digits")));
    }
    let len = value_len(value);
    if len > MAX_VALUE_LEN {
        return Err(OrcapixError::Tlv(format!(
            "field {tag} is {len} chars, limit is {MAX_VALUE_LEN}"
        )));
    }
    out.push_str(tag);
    out.push_str(&format!("{len:02}"));
    out.push_str(value);
    Ok(())
}

fn is_two_digits(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Sequential reader over concatenated TLV fields.
///
/// Yields `Err` once on the first malformed field and then stops.
#[derive(Debug, Clone)]
pub struct TlvReader<'a> {
    rest: &'a str,
    offset: usize,
}

impl<'a> TlvReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            offset: 0,
        }
    }

    fn fail(&mut self, msg: String) -> Option<OrcapixResult<TlvField<'a>>> {
        self.rest = "";
        Some(Err(OrcapixError::Tlv(msg)))
    }
}

impl<'a> Iterator for TlvReader<'a> {
    type Item = OrcapixResult<TlvField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let offset = self.offset;

        let (tag, after_tag) = match split_prefix(self.rest) {
            Some(parts) => parts,
            None => return self.fail(format!("truncated tag at offset {offset}")),
        };
        if !is_two_digits(tag) {
            return self.fail(format!("tag '{tag}' at offset {offset} is not two digits"));
        }
        let (len_str, body) = match split_prefix(after_tag) {
            Some(parts) => parts,
            None => return self.fail(format!("field {tag}: truncated length")),
        };
        if !is_two_digits(len_str) {
            return self.fail(format!("field {tag}: length '{len_str}' is not two digits"));
        }
        let len: usize = len_str.parse().unwrap_or_default();
        let (value, rest) = match split_units(body, len) {
            Some(parts) => parts,
            None => {
                return self.fail(format!(
                    "field {tag}: declares {len} chars, only {} left",
                    value_len(body)
                ))
            }
        };

        self.offset += 4 + len;
        self.rest = rest;
        Some(Ok(TlvField { tag, value }))
    }
}

/// Split off a two-char ASCII prefix.
fn split_prefix(s: &str) -> Option<(&str, &str)> {
    if s.len() >= 2 && s.is_char_boundary(2) {
        Some(s.split_at(2))
    } else {
        None
    }
}

/// Split `s` after `units` UTF-16 code units.
fn split_units(s: &str, units: usize) -> Option<(&str, &str)> {
    let mut seen = 0;
    for (idx, ch) in s.char_indices() {
        if seen == units {
            return Some(s.split_at(idx));
        }
        seen += ch.len_utf16();
        if seen > units {
            return None;
        }
    }
    (seen == units).then_some((s, ""))
}
