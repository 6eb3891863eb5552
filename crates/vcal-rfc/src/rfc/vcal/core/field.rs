//! Field names and the per-block field map.

/// Separator used when several lines share a field name.
pub const VALUE_SEPARATOR: char = ';';

/// Accumulated attendee addresses.
pub const ATTENDEE_KEY: &str = "ATTENDEE";
/// Attendee status codes, parallel to [`ATTENDEE_KEY`].
pub const ATTENDEE_STATUS_KEY: &str = "ATTENDEESTATUS";
/// Organizer address lifted out of a marked attendee line.
pub const ORGANIZER_KEY: &str = "ORGANIZER";
/// Alarm trigger offsets, parameters dropped.
pub const TRIGGER_KEY: &str = "TRIGGER";
/// Free-text description collected across continuation lines.
pub const DESCRIPTION_KEY: &str = "DESCRIPTION";

/// Field names that always start a new item inside a description.
const NEXT_ITEM_PREFIXES: [&str; 5] = ["LOCATION", "DTEND", "SUMMARY", "HASATTENDEE", "ATTACH"];

/// Prefix table checked in order; the first match wins.
const KIND_PREFIXES: [(&str, FieldKind); 24] = [
    ("VEVENTID", FieldKind::EventId),
    ("SUMMARY", FieldKind::Summary),
    ("LOCATION", FieldKind::Location),
    ("DESCRIPTION", FieldKind::Description),
    ("DTSTART", FieldKind::DtStart),
    ("DTEND", FieldKind::DtEnd),
    ("DUE", FieldKind::Due),
    ("COMPLETED", FieldKind::Completed),
    ("RRULE", FieldKind::RRule),
    ("DURATION", FieldKind::Duration),
    ("TRIGGER", FieldKind::Trigger),
    ("ATTENDEEEMAIL", FieldKind::Attendee),
    ("ATTENDEE", FieldKind::Attendee),
    ("ORGANIZER", FieldKind::Organizer),
    ("ATTACH", FieldKind::Attach),
    ("CLASS", FieldKind::Class),
    ("ACCESSLEVEL", FieldKind::AccessLevel),
    ("AVAILABILITY", FieldKind::Availability),
    ("AVAILABLITY", FieldKind::AvailabilityLegacy),
    ("X-ALLDAY", FieldKind::AllDay),
    ("HAS_ALARM", FieldKind::HasAlarm),
    ("HAS_ATTENDEE", FieldKind::HasAttendee),
    ("HASATTENDEE", FieldKind::HasAttendee),
    ("REMINDERS", FieldKind::Reminders),
];

/// The kind of a content line, resolved once from its field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Begin,
    End,
    EventId,
    Summary,
    Location,
    Description,
    DtStart,
    DtEnd,
    Due,
    Completed,
    RRule,
    Duration,
    Trigger,
    /// `ATTENDEEEMAIL` (legacy) or `ATTENDEE`.
    Attendee,
    Organizer,
    Attach,
    Class,
    AccessLevel,
    Availability,
    /// The misspelled `AVAILABLITY` some producers write.
    AvailabilityLegacy,
    AllDay,
    HasAlarm,
    /// `HAS_ATTENDEE` or `HASATTENDEE`.
    HasAttendee,
    Reminders,
    Other,
}

impl FieldKind {
    /// Classifies a field name, parameters included (`DTSTART;TZID=...`).
    #[must_use]
    pub fn classify(field_name: &str) -> Self {
        let name = field_name.to_ascii_uppercase();
        let base = name.split(';').next().unwrap_or_default();

        match base {
            "BEGIN" => return Self::Begin,
            "END" => return Self::End,
            _ => {}
        }

        KIND_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map_or(Self::Other, |&(_, kind)| kind)
    }
}

/// Heuristic used while collecting a multi-line description: does `line`
/// look like the start of a new item rather than more description text?
///
/// True for a handful of well-known field names, or when the name before the
/// first `:` (parameters stripped) is entirely upper-case letters. Anything
/// else, including `-`, `_` or digits in the name, is read as description
/// text, so `X-ALLDAY:1` right after a description stays part of it.
#[must_use]
pub fn is_next_item(line: &str) -> bool {
    if NEXT_ITEM_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return true;
    }

    let Some(pos) = line.find(':') else {
        return false;
    };
    if pos == 0 {
        return false;
    }

    let name = &line[..pos];
    let name = match name.find(';') {
        Some(semi) if semi > 0 => &name[..semi],
        _ => name,
    };
    name.chars().all(char::is_uppercase)
}

/// Raw field values of one VEVENT/VTODO block.
///
/// Keys are field names as written, parameters included. Repeated names
/// accumulate with `;` rather than overwrite. Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the value stored under exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the first entry whose name classifies as `kind`.
    #[must_use]
    pub fn find(&self, kind: FieldKind) -> Option<(&str, &str)> {
        self.iter().find(|(k, _)| FieldKind::classify(k) == kind)
    }

    /// Returns the value of the first entry classified as `kind`.
    #[must_use]
    pub fn value_of(&self, kind: FieldKind) -> Option<&str> {
        self.find(kind).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Adds `value` under `name`, joining onto an existing value with `;`.
    pub fn append(&mut self, name: &str, value: &str) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| k == name) {
            existing.push(VALUE_SEPARATOR);
            existing.push_str(value);
        } else {
            self.entries.push((name.to_string(), value.to_string()));
        }
    }

    /// Stores `value` under `name`, replacing any existing value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| k == name) {
            *existing = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Appends `text` in place, with no separator, to the value under `name`.
    ///
    /// Returns false if no such field exists.
    pub fn extend_value(&mut self, name: &str, text: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => {
                existing.push_str(text);
                true
            }
            None => false,
        }
    }
}
