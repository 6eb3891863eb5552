//! Legacy vCalendar / ICS importer.
//!
//! Turns a raw calendar document into an ordered list of [`EventRecord`]s.
//! See [`rfc::vcal`] for the pipeline stages.

pub mod error;
pub mod rfc;

pub use error::{ImportError, ImportResult};
pub use rfc::vcal::{
    AccessLevel, Attendee, ContentHint, EventRecord, FieldMap, ImportOptions, import, map_record,
    parse_blocks,
};
