//! Byte and charset decoding for vCalendar text values.
//!
//! Documents arrive as raw bytes. The whole buffer is read as UTF-8, then
//! individual values are de-escaped according to the charset announced on
//! the record's SUMMARY field.

use encoding_rs::GBK;
use thiserror::Error;

/// Escape marker shared by quoted-printable values and soft line wraps.
pub const ESCAPE_CHAR: u8 = b'=';

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Errors raised while de-escaping a single value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid quoted-printable encoding at byte {position}")]
    InvalidQuotedPrintable { position: usize },
}

/// Decoding mode for text values of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// `CHARSET=GBK`: hex blob interpreted as GBK.
    Gbk,
    /// `CHARSET=UTF-8`: quoted-printable over UTF-8.
    Utf8,
    /// No charset marker; values are used as written.
    #[default]
    Passthrough,
}

impl Charset {
    /// Selects the mode from a field name with its parameter suffix,
    /// e.g. `SUMMARY;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8`.
    #[must_use]
    pub fn detect(field_name: &str) -> Self {
        let upper = field_name.to_ascii_uppercase();
        if upper.contains("CHARSET=GBK") {
            Self::Gbk
        } else if upper.contains("CHARSET=UTF-8") {
            Self::Utf8
        } else {
            Self::Passthrough
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gbk => "GBK",
            Self::Utf8 => "UTF-8",
            Self::Passthrough => "PASSTHROUGH",
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes a raw document buffer as UTF-8.
///
/// Invalid sequences are replaced rather than rejected, and a leading byte
/// order mark is dropped so the first line compares equal to `BEGIN:VCALENDAR`.
#[must_use]
pub fn decode_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// De-escapes a text value according to `charset`.
///
/// ## Errors
/// Returns [`DecodeError::InvalidQuotedPrintable`] in UTF-8 mode when an
/// escape marker is not followed by two hex digits. The other modes never fail.
pub fn dequote(text: &str, charset: Charset) -> Result<String, DecodeError> {
    match charset {
        Charset::Passthrough => Ok(text.to_string()),
        Charset::Utf8 => decode_quoted_printable(text),
        Charset::Gbk => Ok(decode_gbk(text)),
    }
}

/// Decodes `=XX` escapes into raw bytes and reads the result as UTF-8.
///
/// ## Errors
/// Returns an error on a truncated escape or a non-hex digit pair.
pub fn decode_quoted_printable(text: &str) -> Result<String, DecodeError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESCAPE_CHAR {
            let pair = bytes
                .get(i + 1..i + 3)
                .ok_or(DecodeError::InvalidQuotedPrintable { position: i })?;
            let mut decoded = [0u8; 1];
            hex::decode_to_slice(pair, &mut decoded)
                .map_err(|_e| DecodeError::InvalidQuotedPrintable { position: i })?;
            out.push(decoded[0]);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Best-effort GBK decoding.
///
/// A value that starts with the escape marker is treated as one hex blob:
/// every marker is removed and the digits are decoded as GBK bytes. Anything
/// else is assumed to be decoded already. Malformed input yields an empty
/// string.
#[must_use]
pub fn decode_gbk(text: &str) -> String {
    if !text.starts_with(char::from(ESCAPE_CHAR)) {
        return text.to_string();
    }

    let digits: String = text.chars().filter(|&c| c != '=').collect();
    let Ok(bytes) = hex::decode(&digits) else {
        tracing::debug!(len = digits.len(), "GBK value is not a hex blob");
        return String::new();
    };

    GBK.decode_without_bom_handling_and_without_replacement(&bytes)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default()
}
