//! Caller-supplied import options.

use std::path::Path;

/// What the caller knows about where the document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentHint {
    /// A `.ics` file: stricter standard profile.
    Ics,
    /// Anything else, typically a `.vcs` export.
    #[default]
    VCalendar,
}

impl ContentHint {
    /// Classifies a file name or path by its extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("ics") => Self::Ics,
            _ => Self::VCalendar,
        }
    }

    #[must_use]
    pub const fn is_ics(self) -> bool {
        matches!(self, Self::Ics)
    }
}

/// Options for one import call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub hint: ContentHint,
    /// TZID assumed when a record's start field carries none.
    pub default_timezone: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            hint: ContentHint::default(),
            default_timezone: "UTC".to_string(),
        }
    }
}

impl ImportOptions {
    #[must_use]
    pub fn new(hint: ContentHint) -> Self {
        Self {
            hint,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_default_timezone(mut self, tzid: impl Into<String>) -> Self {
        self.default_timezone = tzid.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_from_extension() {
        assert_eq!(ContentHint::from_path("/sdcard/backup/cal.ics"), ContentHint::Ics);
        assert_eq!(ContentHint::from_path("CAL.ICS"), ContentHint::Ics);
        assert_eq!(ContentHint::from_path("cal.vcs"), ContentHint::VCalendar);
        assert_eq!(ContentHint::from_path("ics"), ContentHint::VCalendar);
    }

    #[test]
    fn default_options_use_utc() {
        let options = ImportOptions::new(ContentHint::Ics).with_default_timezone("Asia/Shanghai");
        assert!(options.hint.is_ics());
        assert_eq!(options.default_timezone, "Asia/Shanghai");
        assert_eq!(ImportOptions::default().default_timezone, "UTC");
    }
}
