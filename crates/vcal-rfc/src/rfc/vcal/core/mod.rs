//! vCalendar data model.
//!
//! - [`FieldMap`]: raw field values of one block, keyed by field name
//! - [`FieldKind`]: the field-name table, legacy synonyms included
//! - [`EventRecord`]: the structured output unit

mod field;
mod options;
mod record;

pub use field::{
    ATTENDEE_KEY, ATTENDEE_STATUS_KEY, DESCRIPTION_KEY, FieldKind, FieldMap, ORGANIZER_KEY,
    TRIGGER_KEY, VALUE_SEPARATOR, is_next_item,
};
pub use options::{ContentHint, ImportOptions};
pub use record::{AccessLevel, Attendee, EventRecord, NO_ID};
