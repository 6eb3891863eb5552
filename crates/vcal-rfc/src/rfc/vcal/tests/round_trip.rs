//! Serialize a record back to vCalendar text, import it again and compare
//! the fields the importer can carry through.

use super::fixtures::*;
use crate::rfc::vcal::core::{ContentHint, EventRecord, ImportOptions};
use crate::rfc::vcal::datetime::{self, Zone};
use crate::rfc::vcal::import;

/// Minimal exporter mirroring what legacy phones write.
fn serialize(record: &EventRecord) -> String {
    let zone = Zone::resolve(&record.timezone);
    let tz = &record.timezone;

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:1.0".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("VEVENTID:{}", record.id),
        format!("DTSTART;TZID={tz}:{}", datetime::format(record.start, &zone, false)),
    ];
    if let Some(end) = record.end {
        lines.push(format!("DTEND;TZID={tz}:{}", datetime::format(end, &zone, false)));
    }
    if let Some(title) = &record.title {
        lines.push(format!("SUMMARY:{title}"));
    }
    if let Some(location) = &record.location {
        lines.push(format!("LOCATION:{location}"));
    }
    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    lines.join("\r\n") + "\r\n"
}

fn round_trip(input: &str) -> Result<(), String> {
    let options = ImportOptions::new(ContentHint::VCalendar);
    let first =
        import(input.as_bytes(), &options).map_err(|e| format!("First import failed: {e}"))?;
    let record = first.first().ok_or("No record imported")?;

    let serialized = serialize(record);
    let second = import(serialized.as_bytes(), &options)
        .map_err(|e| format!("Second import failed: {e}\n{serialized}"))?;
    let again = second.first().ok_or("No record after round trip")?;

    let checks = [
        ("id", record.id == again.id),
        ("start", record.start == again.start),
        ("end", record.end == again.end),
        ("title", record.title == again.title),
        ("location", record.location == again.location),
        ("timezone", record.timezone == again.timezone),
    ];
    match checks.iter().find(|(_, same)| !same) {
        Some((field, _)) => Err(format!("{field} changed:\n{serialized}")),
        None => Ok(()),
    }
}

#[test]
fn round_trip_basic() {
    round_trip(VEVENT_BASIC).expect("round trip should succeed");
}

#[test]
fn round_trip_zoned() {
    round_trip(VEVENT_FULL).expect("round trip should succeed");
}

#[test]
fn round_trip_fixed_offset() {
    let input = "\
BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
VEVENTID:3\r\n\
SUMMARY:Offset\r\n\
DTSTART;TZID=+0530:20231231T233000Z\r\n\
DTEND;TZID=+0530:20240101T003000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    round_trip(input).expect("round trip should succeed");
}

#[test]
fn round_trip_decoded_title() {
    // Decoded titles are written back as plain text
    round_trip(VEVENT_UTF8).expect("round trip should succeed");
}
