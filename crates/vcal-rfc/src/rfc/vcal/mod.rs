//! Legacy vCalendar (`.vcs`) and ICS import.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`decode`]: raw bytes to text, plus per-value charset handling
//! 2. [`parse::LineUnfolder`]: physical lines to logical lines
//! 3. [`parse::parse_blocks`]: logical lines to one [`FieldMap`] per VEVENT/VTODO
//! 4. [`map::map_record`]: each map to an [`EventRecord`]
//!
//! [`import`] runs all of them.

pub mod core;
pub mod datetime;
pub mod decode;
mod importer;
pub mod map;
pub mod parse;

#[cfg(test)]
mod tests;

pub use self::core::{AccessLevel, Attendee, ContentHint, EventRecord, FieldMap, ImportOptions};
pub use importer::import;
pub use map::map_record;
pub use parse::parse_blocks;
