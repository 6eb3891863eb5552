//! Whole-document import behaviour.

use chrono::{DateTime, TimeZone, Utc};

use super::fixtures::*;
use crate::error::ImportError;
use crate::rfc::vcal::core::{AccessLevel, ContentHint, ImportOptions};
use crate::rfc::vcal::datetime::{self, FormatError, Zone};
use crate::rfc::vcal::import;
use crate::rfc::vcal::parse::ParseError;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn vcs() -> ImportOptions {
    ImportOptions::new(ContentHint::VCalendar)
}

fn ics() -> ImportOptions {
    ImportOptions::new(ContentHint::Ics)
}

#[test_log::test]
fn basic_event() {
    let records = import(VEVENT_BASIC.as_bytes(), &vcs()).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, 7);
    assert_eq!(record.title.as_deref(), Some("Team sync"));
    assert_eq!(record.location.as_deref(), Some("Room 2"));
    assert_eq!(record.start, utc(2023, 3, 1, 9, 0));
    assert_eq!(record.end, Some(utc(2023, 3, 1, 10, 0)));
    assert_eq!(record.access_level, AccessLevel::Private);
    assert_eq!(record.availability, 1);
    assert!(!record.all_day);
}

#[test_log::test]
fn gbk_record_decodes_hex_blob() {
    let records = import(VEVENT_GBK.as_bytes(), &vcs()).unwrap();
    assert_eq!(records[0].title.as_deref(), Some("\u{4e2d}\u{6587}"));
    assert_eq!(records[0].location.as_deref(), Some("\u{6587}"));
}

#[test_log::test]
fn utf8_record_decodes_quoted_printable() {
    let records = import(VEVENT_UTF8.as_bytes(), &vcs()).unwrap();
    assert_eq!(records[0].title.as_deref(), Some("\u{4e2d}\u{6587}"));
    assert_eq!(records[0].location.as_deref(), Some("\u{6587}"));
}

#[test_log::test]
fn early_completion_ends_one_hour_after_due() {
    let records = import(VTODO_COMPLETED_EARLY.as_bytes(), &vcs()).unwrap();
    let record = &records[0];
    assert_eq!(record.start, utc(2023, 1, 1, 10, 0));

    let end = record.end.unwrap();
    assert_eq!(datetime::format(end, &Zone::Utc, false), "20230101T110000Z");
}

#[test_log::test]
fn late_completion_is_kept() {
    let records = import(VTODO_COMPLETED_LATE.as_bytes(), &vcs()).unwrap();
    let end = records[0].end.unwrap();
    assert_eq!(datetime::format(end, &Zone::Utc, false), "20230101T150000Z");
}

#[test_log::test]
fn ics_date_only_bounds_are_all_day() {
    let records = import(ICS_ALL_DAY.as_bytes(), &ics()).unwrap();
    let record = &records[0];
    assert!(record.all_day);
    assert_eq!(record.timezone, "UTC");
    assert_eq!(record.start, utc(2023, 1, 1, 0, 0));
    assert_eq!(record.end, Some(utc(2023, 1, 2, 0, 0)));
}

#[test_log::test]
fn ics_timed_bounds_are_not_all_day() {
    let records = import(ICS_TIMED.as_bytes(), &ics()).unwrap();
    let record = &records[0];
    assert!(!record.all_day);
    // ICS documents are read in UTC whatever TZID says
    assert_eq!(record.timezone, "UTC");
    assert_eq!(record.start, utc(2023, 1, 1, 9, 0));
}

#[test_log::test]
fn attachment_is_discarded() {
    let blocks = crate::rfc::vcal::parse_blocks(VEVENT_WITH_ATTACHMENT).unwrap();
    assert!(blocks[0].keys().all(|k| !k.starts_with("ATTACH")));
    assert!(blocks[0].iter().all(|(_, v)| !v.contains("AAAA")));

    let records = import(VEVENT_WITH_ATTACHMENT.as_bytes(), &vcs()).unwrap();
    assert_eq!(records[0].title.as_deref(), Some("With file"));
    assert_eq!(records[0].location.as_deref(), Some("Lab"));
}

#[test_log::test]
fn full_event() {
    let records = import(VEVENT_FULL.as_bytes(), &vcs()).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, 12);
    assert_eq!(record.timezone, "Asia/Shanghai");
    assert_eq!(record.start, utc(2023, 6, 15, 6, 0));
    assert_eq!(record.end, Some(utc(2023, 6, 15, 7, 30)));
    assert_eq!(
        record.description.as_deref(),
        Some("Bring the draft\nand the numbers")
    );
    assert_eq!(
        record.attendee_emails().collect::<Vec<_>>(),
        ["lead@example.com", "dev@example.com"]
    );
    assert_eq!(
        record.attendee_statuses().collect::<Vec<_>>(),
        [Some(1), Some(2)]
    );
    assert_eq!(record.organizer.as_deref(), Some("lead@example.com"));
    assert_eq!(record.rrule.as_deref(), Some("FREQ=WEEKLY;COUNT=4"));
    assert_eq!(record.access_level, AccessLevel::Public);
    assert!(record.has_alarm);
    assert!(record.has_attendee);
    assert_eq!(record.alarm_minutes, ["15", "60"]);
}

#[test_log::test]
fn unterminated_document_yields_nothing() {
    let err = import(UNTERMINATED.as_bytes(), &vcs()).unwrap_err();
    assert_eq!(err.unterminated_block(), Some("VEVENT"));
    assert!(matches!(
        err,
        ImportError::Parse(ParseError::UnterminatedBlock { .. })
    ));
}

#[test_log::test]
fn malformed_time_names_the_record() {
    let err = import(BAD_START.as_bytes(), &vcs()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Format {
            index: 1,
            source: FormatError::InvalidShape { .. }
        }
    ));
}

#[test_log::test]
fn missing_header_is_rejected() {
    let err = import(b"VERSION:1.0\r\n", &vcs()).unwrap_err();
    assert_eq!(err, ImportError::Parse(ParseError::MissingBegin { line: 1 }));
}

#[test_log::test]
fn bom_and_lf_endings_are_accepted() {
    let input = format!("\u{feff}{}", VEVENT_BASIC.replace("\r\n", "\n"));
    let records = import(input.as_bytes(), &vcs()).unwrap();
    assert_eq!(records[0].title.as_deref(), Some("Team sync"));
}

#[test_log::test]
fn empty_calendar_yields_no_records() {
    let records = import(b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n", &vcs()).unwrap();
    assert!(records.is_empty());
}
