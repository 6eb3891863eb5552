use crate::error::{ImportError, ImportResult};
use crate::rfc::vcal::core::{EventRecord, ImportOptions};
use crate::rfc::vcal::decode::decode_utf8;
use crate::rfc::vcal::map::map_record;
use crate::rfc::vcal::parse::parse_blocks;

/// Imports every VEVENT and VTODO of a raw document, in document order.
///
/// A structural failure anywhere in the document yields no records.
///
/// ## Errors
/// Returns [`ImportError::Parse`] for structural failures and
/// [`ImportError::Format`] when a record's start or end time is malformed.
#[tracing::instrument(skip(bytes, options), fields(input_len = bytes.len(), hint = ?options.hint))]
pub fn import(bytes: &[u8], options: &ImportOptions) -> ImportResult<Vec<EventRecord>> {
    let text = decode_utf8(bytes);
    let blocks = parse_blocks(&text)?;

    let records = blocks
        .iter()
        .enumerate()
        .map(|(index, fields)| {
            map_record(fields, options).map_err(|source| ImportError::Format { index, source })
        })
        .collect::<ImportResult<Vec<_>>>()?;

    tracing::debug!(count = records.len(), "Imported records");
    Ok(records)
}
