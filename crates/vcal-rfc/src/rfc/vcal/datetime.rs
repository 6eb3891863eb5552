//! Compact calendar-time codec.
//!
//! The legacy format writes times as `YYYYMMDDTHHMMSSZ` where the trailing
//! `Z` is a sentinel, not a UTC marker: the digits are wall-clock time in the
//! record's zone. Date-only values (`YYYYMMDD`) mean local midnight.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use thiserror::Error;

/// Suffix appended to date-only values before parsing.
const MIDNIGHT_SUFFIX: &str = "T000000Z";

const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Date/time text that does not match an accepted shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid calendar time '{text}': expected YYYYMMDD or YYYYMMDDTHHMMSSZ")]
    InvalidShape { text: String },

    #[error("Calendar time '{text}' is out of range")]
    OutOfRange { text: String },
}

/// A resolved time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Utc,
    /// A numeric offset such as `+0800` or `GMT+8`.
    Fixed(FixedOffset),
    /// An IANA zone name.
    Named(Tz),
}

impl Zone {
    /// Resolves a TZID parameter value.
    ///
    /// Unknown identifiers fall back to UTC.
    #[must_use]
    pub fn resolve(tzid: &str) -> Self {
        let tzid = tzid.trim().trim_matches('"');
        if tzid.is_empty()
            || tzid.eq_ignore_ascii_case("UTC")
            || tzid.eq_ignore_ascii_case("GMT")
            || tzid == "Z"
        {
            return Self::Utc;
        }

        if let Some(offset) = parse_offset(tzid) {
            return Self::Fixed(offset);
        }

        if let Ok(tz) = tzid.parse::<Tz>() {
            return Self::Named(tz);
        }

        tracing::debug!(tzid, "Unknown TZID, falling back to UTC");
        Self::Utc
    }

    /// Standard (non-DST) offset in effect at `at`.
    #[must_use]
    pub fn standard_offset(&self, at: DateTime<Utc>) -> TimeDelta {
        match self {
            Self::Utc => TimeDelta::zero(),
            Self::Fixed(offset) => TimeDelta::seconds(i64::from(offset.local_minus_utc())),
            Self::Named(tz) => tz.offset_from_utc_datetime(&at.naive_utc()).base_utc_offset(),
        }
    }

    /// Additional daylight-saving offset in effect at `at`.
    #[must_use]
    pub fn dst_offset(&self, at: DateTime<Utc>) -> TimeDelta {
        match self {
            Self::Utc | Self::Fixed(_) => TimeDelta::zero(),
            Self::Named(tz) => tz.offset_from_utc_datetime(&at.naive_utc()).dst_offset(),
        }
    }

    /// Interprets wall-clock fields in this zone.
    ///
    /// Ambiguous times resolve to the earlier instant; times skipped by a DST
    /// transition are shifted by the standard offset only.
    #[must_use]
    pub fn to_instant(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self {
            Self::Utc => local.and_utc(),
            Self::Fixed(offset) => (local - TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .and_utc(),
            Self::Named(tz) => tz.from_local_datetime(&local).earliest().map_or_else(
                || (local - self.standard_offset(local.and_utc())).and_utc(),
                |dt| dt.with_timezone(&Utc),
            ),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utc => f.write_str("UTC"),
            Self::Fixed(offset) => f.write_str(&offset_string(offset.local_minus_utc() / 60)),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Parses `+0800`, `+08:00`, `-5`, `GMT+8` or `UTC-03:30` into an offset.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let body = s
        .strip_prefix("GMT")
        .or_else(|| s.strip_prefix("UTC"))
        .unwrap_or(s);
    let (sign, digits) = match body.as_bytes().first()? {
        b'+' => (1, &body[1..]),
        b'-' => (-1, &body[1..]),
        _ => return None,
    };
    let digits = digits.replace(':', "");
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().ok()?,
            digits[split..].parse::<i32>().ok()?,
        )
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Renders an instant as zone-local wall-clock text with the `Z` sentinel.
///
/// The zone's standard offset, plus its DST offset when `is_dst` is set, is
/// applied to the instant before the fields are written.
#[must_use]
pub fn format(instant: DateTime<Utc>, zone: &Zone, is_dst: bool) -> String {
    let mut shift = zone.standard_offset(instant);
    if is_dst {
        shift += zone.dst_offset(instant);
    }
    (instant.naive_utc() + shift).format(COMPACT_FORMAT).to_string()
}

/// Parses compact calendar-time text into an instant, reading the fields as
/// wall-clock time in `zone`.
///
/// Accepted shapes are `YYYYMMDD`, `YYYYMMDDTHHMMSSZ` and the zoned
/// `YYYYMMDDTHHMMSS`.
///
/// ## Errors
/// Returns [`FormatError::InvalidShape`] for any other length or layout and
/// [`FormatError::OutOfRange`] when the fields do not name a real date/time.
pub fn parse(text: &str, zone: &Zone) -> Result<DateTime<Utc>, FormatError> {
    Ok(zone.to_instant(parse_local(text)?))
}

/// Parses compact calendar-time text into naive wall-clock fields.
///
/// ## Errors
/// See [`parse`].
pub fn parse_local(text: &str) -> Result<NaiveDateTime, FormatError> {
    let shape_error = || FormatError::InvalidShape {
        text: text.to_string(),
    };

    let full;
    let s = match text.len() {
        8 => {
            full = format!("{text}{MIDNIGHT_SUFFIX}");
            full.as_str()
        }
        15 | 16 => text,
        _ => return Err(shape_error()),
    };

    let b = s.as_bytes();
    if b[8] != b'T' || (b.len() == 16 && b[15] != b'Z') {
        return Err(shape_error());
    }
    if !b[..8].iter().chain(&b[9..15]).all(u8::is_ascii_digit) {
        return Err(shape_error());
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        b[range]
            .iter()
            .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
    };
    let out_of_range = || FormatError::OutOfRange {
        text: text.to_string(),
    };

    let year = i32::try_from(field(0..4)).map_err(|_e| out_of_range())?;
    NaiveDate::from_ymd_opt(year, field(4..6), field(6..8))
        .and_then(|date| date.and_hms_opt(field(9..11), field(11..13), field(13..15)))
        .ok_or_else(out_of_range)
}

/// Formats naive wall-clock fields in the compact form.
#[must_use]
pub fn format_local(local: NaiveDateTime) -> String {
    local.format(COMPACT_FORMAT).to_string()
}

/// Formats a UTC offset in minutes as `±HHMM`.
#[must_use]
pub fn offset_string(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let total = offset_minutes.unsigned_abs();
    format!("{sign}{:02}{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parse_full_form_in_utc() {
        let t = parse("20230101T100000Z", &Zone::Utc).unwrap();
        assert_eq!(t, utc(2023, 1, 1, 10, 0, 0));
    }

    #[test]
    fn parse_date_only_is_midnight() {
        let t = parse("20230101", &Zone::Utc).unwrap();
        assert_eq!(t, utc(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn parse_reads_wall_clock_in_zone() {
        let zone = Zone::resolve("+0800");
        let t = parse("20230101T100000Z", &zone).unwrap();
        assert_eq!(t, utc(2023, 1, 1, 2, 0, 0));
    }

    #[test]
    fn parse_accepts_zoned_form_without_sentinel() {
        let zone = Zone::resolve("Asia/Shanghai");
        let t = parse("20230101T090000", &zone).unwrap();
        assert_eq!(t, utc(2023, 1, 1, 1, 0, 0));
    }

    #[test]
    fn parse_rejects_other_shapes() {
        for text in [
            "",
            "2023010",
            "202301011",
            "20230101T1000",
            "20230101X100000Z",
            "20230101T100000Q",
            "2023O101T100000Z",
        ] {
            assert!(
                matches!(parse(text, &Zone::Utc), Err(FormatError::InvalidShape { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_impossible_dates() {
        assert!(matches!(
            parse("20231301T000000Z", &Zone::Utc),
            Err(FormatError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse("20230101T250000Z", &Zone::Utc),
            Err(FormatError::OutOfRange { .. })
        ));
    }

    #[test]
    fn format_renders_wall_clock_with_sentinel() {
        let zone = Zone::resolve("GMT+8");
        assert_eq!(format(utc(2023, 1, 1, 2, 0, 0), &zone, false), "20230101T100000Z");
        assert_eq!(format(utc(2023, 1, 1, 2, 0, 0), &Zone::Utc, false), "20230101T020000Z");
    }

    #[test]
    fn format_applies_dst_on_request() {
        let zone = Zone::resolve("Europe/Berlin");
        let summer = utc(2023, 7, 1, 10, 0, 0);
        assert_eq!(format(summer, &zone, false), "20230701T110000Z");
        assert_eq!(format(summer, &zone, true), "20230701T120000Z");
    }

    #[test]
    fn format_then_parse_round_trips_without_dst() {
        let instants = [
            utc(1999, 12, 31, 23, 59, 59),
            utc(2023, 1, 1, 10, 0, 0),
            utc(2024, 2, 29, 0, 30, 15),
        ];
        let zones = [
            Zone::Utc,
            Zone::resolve("+0530"),
            Zone::resolve("-0800"),
            Zone::resolve("Asia/Shanghai"),
        ];
        for zone in &zones {
            for &t in &instants {
                let text = format(t, zone, false);
                assert_eq!(parse(&text, zone).unwrap(), t, "{zone} {text}");
            }
        }
    }

    #[test]
    fn resolve_zone_identifiers() {
        assert_eq!(Zone::resolve("UTC"), Zone::Utc);
        assert_eq!(Zone::resolve(""), Zone::Utc);
        assert_eq!(Zone::resolve("Not/AZone"), Zone::Utc);
        assert_eq!(
            Zone::resolve("+08:00"),
            Zone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
        );
        assert_eq!(
            Zone::resolve("UTC-03:30"),
            Zone::Fixed(FixedOffset::west_opt(3 * 3600 + 1800).unwrap())
        );
        assert_eq!(Zone::resolve("Asia/Shanghai"), Zone::Named(Tz::Asia__Shanghai));
    }

    #[test]
    fn zone_display_uses_offset_string() {
        assert_eq!(Zone::resolve("GMT+8").to_string(), "+0800");
        assert_eq!(Zone::resolve("-0330").to_string(), "-0330");
        assert_eq!(Zone::Utc.to_string(), "UTC");
    }

    #[test]
    fn offset_string_pads_and_signs() {
        assert_eq!(offset_string(0), "+0000");
        assert_eq!(offset_string(480), "+0800");
        assert_eq!(offset_string(330), "+0530");
        assert_eq!(offset_string(-300), "-0500");
        assert_eq!(offset_string(-30), "-0030");
        assert_eq!(offset_string(765), "+1245");
    }
}
