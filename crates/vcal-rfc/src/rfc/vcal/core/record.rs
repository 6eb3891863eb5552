//! Structured event records produced by an import.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Record id used when the document carries none.
pub const NO_ID: i64 = -1;

/// Visibility of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Default,
    Confidential,
    Private,
    Public,
}

impl AccessLevel {
    /// Maps the numeric code stored by calendar providers.
    ///
    /// Unknown codes map to [`AccessLevel::Default`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Confidential,
            2 => Self::Private,
            3 => Self::Public,
            _ => Self::Default,
        }
    }

    /// Maps a `CLASS` token.
    #[must_use]
    pub fn from_class(token: &str) -> Self {
        match token {
            "PRIVATE" => Self::Private,
            "PUBLIC" => Self::Public,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Confidential => 1,
            Self::Private => 2,
            Self::Public => 3,
        }
    }
}

/// One attendee with the status code taken from its field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub email: String,
    /// `None` when the field name carried no numeric status.
    pub status: Option<i32>,
}

/// One imported VEVENT or VTODO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub id: i64,
    pub timezone: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub all_day: bool,
    /// RRULE text, passed through uninterpreted.
    pub rrule: Option<String>,
    pub attendees: Vec<Attendee>,
    pub organizer: Option<String>,
    pub access_level: AccessLevel,
    pub availability: i32,
    pub alarm_minutes: Vec<String>,
    pub has_alarm: bool,
    pub has_attendee: bool,
    pub duration: Option<String>,
}

impl EventRecord {
    /// Attendee addresses in document order.
    pub fn attendee_emails(&self) -> impl Iterator<Item = &str> {
        self.attendees.iter().map(|a| a.email.as_str())
    }

    /// Attendee status codes, parallel to [`Self::attendee_emails`].
    pub fn attendee_statuses(&self) -> impl Iterator<Item = Option<i32>> + '_ {
        self.attendees.iter().map(|a| a.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_codes() {
        assert_eq!(AccessLevel::from_class("PRIVATE").code(), 2);
        assert_eq!(AccessLevel::from_class("PUBLIC").code(), 3);
        assert_eq!(AccessLevel::from_class("CONFIDENTIAL"), AccessLevel::Default);
        assert_eq!(AccessLevel::from_code(1), AccessLevel::Confidential);
        assert_eq!(AccessLevel::from_code(42), AccessLevel::Default);
    }

    #[test]
    fn access_level_serializes_snake_case() {
        let json = serde_json::to_string(&AccessLevel::Private).unwrap();
        assert_eq!(json, "\"private\"");
    }
}
