//! Field map to event record conversion.

use chrono::{DateTime, TimeDelta, Utc};

use crate::rfc::vcal::core::{
    ATTENDEE_KEY, ATTENDEE_STATUS_KEY, AccessLevel, Attendee, DESCRIPTION_KEY, EventRecord,
    FieldKind, FieldMap, ImportOptions, NO_ID, TRIGGER_KEY, VALUE_SEPARATOR,
};
use crate::rfc::vcal::datetime::{self, FormatError, Zone};
use crate::rfc::vcal::decode::{Charset, ESCAPE_CHAR, dequote};

const UTC: &str = "UTC";
const MAILTO: &str = "mailto:";
/// Characters dropped from the front of each TRIGGER token (`-PT`).
const TRIGGER_PREFIX_LEN: usize = 3;

/// Converts one block's fields into an [`EventRecord`].
///
/// Text fields are decoded with the charset announced on SUMMARY. A field
/// that fails to decode becomes empty and a malformed numeral falls back to
/// its default; neither aborts the record.
///
/// ## Errors
/// Returns a [`FormatError`] if the start or end time text is malformed.
#[tracing::instrument(skip_all, fields(field_count = fields.len()))]
pub fn map_record(fields: &FieldMap, options: &ImportOptions) -> Result<EventRecord, FormatError> {
    let charset = fields
        .find(FieldKind::Summary)
        .map(|(name, _)| Charset::detect(name))
        .unwrap_or_default();
    let mapper = RecordMapper {
        fields,
        options,
        charset,
    };
    tracing::trace!(%charset, "Mapping record");
    mapper.map()
}

struct RecordMapper<'a> {
    fields: &'a FieldMap,
    options: &'a ImportOptions,
    charset: Charset,
}

/// Start/end resolution for one record.
struct Times {
    timezone: String,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    start_text: Option<String>,
    end_text: Option<String>,
}

/// Alarm and attendee flags, from TRIGGER or the legacy fields.
struct Alarms {
    has_alarm: bool,
    has_attendee: bool,
    minutes: Vec<String>,
}

impl RecordMapper<'_> {
    fn map(&self) -> Result<EventRecord, FormatError> {
        let times = self.times()?;
        let all_day = self.all_day(&times);
        let alarms = self.alarms();

        Ok(EventRecord {
            id: self.id(),
            timezone: times.timezone,
            start: times.start,
            end: times.end,
            title: self.text(FieldKind::Summary),
            location: self.text(FieldKind::Location),
            description: self
                .fields
                .get(DESCRIPTION_KEY)
                .and_then(non_empty)
                .map(|raw| self.decode("DESCRIPTION", raw)),
            all_day,
            rrule: self.raw(FieldKind::RRule).map(str::to_string),
            attendees: self.attendees(),
            organizer: self
                .raw(FieldKind::Organizer)
                .map(|raw| strip_mailto(raw).to_string()),
            access_level: self.access_level(),
            availability: self.availability(),
            alarm_minutes: alarms.minutes,
            has_alarm: alarms.has_alarm,
            has_attendee: alarms.has_attendee,
            duration: self.text(FieldKind::Duration),
        })
    }

    /// Non-empty raw value of the first field of `kind`.
    fn raw(&self, kind: FieldKind) -> Option<&str> {
        self.fields.value_of(kind).and_then(non_empty)
    }

    fn text(&self, kind: FieldKind) -> Option<String> {
        let (name, raw) = self.fields.find(kind)?;
        non_empty(raw).map(|raw| self.decode(name, raw))
    }

    /// Decodes one value, degrading to an empty string on failure.
    fn decode(&self, field: &str, raw: &str) -> String {
        let raw = raw.strip_suffix(char::from(ESCAPE_CHAR)).unwrap_or(raw);
        dequote(raw, self.charset).unwrap_or_else(|e| {
            tracing::warn!(
                field,
                charset = %self.charset,
                error = %e,
                "Failed to decode field, using empty value"
            );
            String::new()
        })
    }

    fn id(&self) -> i64 {
        self.raw(FieldKind::EventId)
            .map_or(NO_ID, |raw| parse_number(raw.trim(), "VEVENTID").unwrap_or(NO_ID))
    }

    /// Resolves timezone, start and end.
    ///
    /// DUE takes priority over DTSTART. Without DTEND, a todo's end comes from
    /// COMPLETED, repaired to one hour after DUE when it is not later than DUE.
    fn times(&self) -> Result<Times, FormatError> {
        let start_field = self
            .fields
            .find(FieldKind::Due)
            .or_else(|| self.fields.find(FieldKind::DtStart));

        let timezone = if self.options.hint.is_ics() {
            UTC.to_string()
        } else {
            start_field
                .and_then(|(name, _)| param_value(name, "TZID"))
                .unwrap_or(self.options.default_timezone.as_str())
                .to_string()
        };
        let zone = Zone::resolve(&timezone);

        let start_text = start_field.and_then(|(_, value)| non_empty(value));
        let start = match start_text {
            Some(text) => datetime::parse(text, &zone)?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };

        let end_text = match self.raw(FieldKind::DtEnd) {
            Some(text) => Some(text.to_string()),
            None => self.repaired_end(&zone)?,
        };
        let end = end_text
            .as_deref()
            .map(|text| datetime::parse(text, &zone))
            .transpose()?;

        Ok(Times {
            timezone,
            start,
            end,
            start_text: start_text.map(str::to_string),
            end_text,
        })
    }

    fn repaired_end(&self, zone: &Zone) -> Result<Option<String>, FormatError> {
        let Some(completed) = self.raw(FieldKind::Completed) else {
            return Ok(None);
        };
        let Some(due) = self.raw(FieldKind::Due) else {
            return Ok(Some(completed.to_string()));
        };

        if datetime::parse(completed, zone)? > datetime::parse(due, zone)? {
            return Ok(Some(completed.to_string()));
        }

        let repaired = datetime::parse_local(due)? + TimeDelta::hours(1);
        tracing::debug!(due, completed, "COMPLETED not after DUE, ending one hour after DUE");
        Ok(Some(datetime::format_local(repaired)))
    }

    /// `.ics` documents are all-day when both times are date-only; others
    /// carry an explicit `X-ALLDAY:1`.
    fn all_day(&self, times: &Times) -> bool {
        if self.options.hint.is_ics() {
            matches!(
                (times.start_text.as_deref(), times.end_text.as_deref()),
                (Some(start), Some(end)) if start.len() == 8 && end.len() == 8
            )
        } else {
            self.raw(FieldKind::AllDay).map(str::trim) == Some("1")
        }
    }

    fn attendees(&self) -> Vec<Attendee> {
        let Some(emails) = self.fields.get(ATTENDEE_KEY).and_then(non_empty) else {
            return Vec::new();
        };
        let mut statuses = self
            .fields
            .get(ATTENDEE_STATUS_KEY)
            .unwrap_or_default()
            .split(VALUE_SEPARATOR);

        emails
            .split(VALUE_SEPARATOR)
            .map(|email| Attendee {
                email: strip_mailto(&self.decode("ATTENDEE", email)).to_string(),
                status: statuses
                    .next()
                    .map(str::trim)
                    .and_then(non_empty)
                    .and_then(|status| parse_number(status, "ATTENDEESTATUS")),
            })
            .collect()
    }

    fn access_level(&self) -> AccessLevel {
        if let Some(code) = self.raw(FieldKind::AccessLevel) {
            return parse_number(code.trim(), "ACCESSLEVEL")
                .map_or_else(AccessLevel::default, AccessLevel::from_code);
        }
        self.raw(FieldKind::Class)
            .map_or_else(AccessLevel::default, |token| AccessLevel::from_class(token.trim()))
    }

    /// `AVAILABILITY` wins over the misspelled `AVAILABLITY`.
    fn availability(&self) -> i32 {
        self.raw(FieldKind::Availability)
            .or_else(|| self.raw(FieldKind::AvailabilityLegacy))
            .and_then(|raw| parse_number(raw.trim(), "AVAILABILITY"))
            .unwrap_or_default()
    }

    fn alarms(&self) -> Alarms {
        let has_attendee = self.raw(FieldKind::HasAttendee).map(str::trim) == Some("1");

        if let Some(trigger) = self.fields.get(TRIGGER_KEY).and_then(non_empty) {
            let minutes = trigger
                .trim()
                .split(VALUE_SEPARATOR)
                .filter_map(|token| {
                    let offset = token.get(TRIGGER_PREFIX_LEN..token.len().saturating_sub(1));
                    if offset.is_none() {
                        tracing::warn!(token, "Skipping malformed TRIGGER token");
                    }
                    offset
                })
                .map(str::to_string)
                .collect();
            return Alarms {
                has_alarm: true,
                has_attendee,
                minutes,
            };
        }

        // Any non-empty HAS_ALARM marks an alarm, "0" included
        let has_alarm = self.raw(FieldKind::HasAlarm).is_some();
        let minutes = self
            .text(FieldKind::Reminders)
            .map(|reminders| {
                reminders
                    .split(VALUE_SEPARATOR)
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Alarms {
            has_alarm,
            has_attendee,
            minutes,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn strip_mailto(s: &str) -> &str {
    match s.get(..MAILTO.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(MAILTO) => &s[MAILTO.len()..],
        _ => s,
    }
}

/// Parses a numeral, logging and returning `None` when it is malformed.
fn parse_number<T: std::str::FromStr>(raw: &str, field: &str) -> Option<T> {
    let parsed = raw.parse::<T>().ok();
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "Ignoring malformed numeric field");
    }
    parsed
}

/// Value of parameter `param` in a field name such as `DTSTART;TZID=Asia/Shanghai`.
fn param_value<'a>(field: &'a str, param: &str) -> Option<&'a str> {
    field.split(';').skip(1).find_map(|segment| {
        segment
            .split_once('=')
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(param))
            .map(|(_, value)| value.trim().trim_matches('"'))
    })
}
