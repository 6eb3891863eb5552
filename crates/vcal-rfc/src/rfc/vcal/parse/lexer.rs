//! Line unfolding for legacy vCalendar documents.
//!
//! Two continuation conventions are joined here:
//! - soft wrap: a physical line ending in `=` continues on the next line
//!   (the marker is removed, nothing is inserted)
//! - tab continuation: a line starting with HTAB extends the previous field
//!
//! Attachment values are dropped here so their data never reaches a block.

use super::error::{ParseError, ParseResult};
use crate::rfc::vcal::decode::ESCAPE_CHAR;

/// Field name prefix of attachment lines.
const ATTACH_PREFIX: &str = "ATTACH";

const SOFT_WRAP: char = ESCAPE_CHAR as char;

/// An unfolded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalLine {
    /// A complete line, soft wraps joined.
    Content { line: usize, text: String },
    /// A tab-indented continuation of the previous field, tab removed.
    Continuation { line: usize, text: String },
}

impl LogicalLine {
    /// Line number of the first physical line (1-based).
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Content { line, .. } | Self::Continuation { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Content { text, .. } | Self::Continuation { text, .. } => text,
        }
    }
}

/// Where we are inside a discarded attachment value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachmentSkip {
    /// Still inside the soft-wrapped value.
    Wrapped,
    /// Value finished; tab continuations still belong to it.
    Tail,
}

/// Lazily unfolds decoded text into logical lines.
///
/// Single pass: each physical line is read once and the iterator cannot be
/// restarted.
#[derive(Debug)]
pub struct LineUnfolder<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: Option<(usize, String)>,
    skip: Option<AttachmentSkip>,
    last_line: usize,
}

impl<'a> LineUnfolder<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            pending: None,
            skip: None,
            last_line: 0,
        }
    }

    /// Number of the last physical line read so far.
    #[must_use]
    pub const fn last_line(&self) -> usize {
        self.last_line
    }
}

impl Iterator for LineUnfolder<'_> {
    type Item = ParseResult<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((idx, raw)) = self.lines.next() else {
                // A dangling soft wrap at end of input still counts as a line
                return self
                    .pending
                    .take()
                    .map(|(line, text)| Ok(LogicalLine::Content { line, text }));
            };
            let line_num = idx + 1;
            self.last_line = line_num;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);

            match self.skip {
                Some(AttachmentSkip::Wrapped) => {
                    if !raw.ends_with(SOFT_WRAP) {
                        self.skip = Some(AttachmentSkip::Tail);
                    }
                    continue;
                }
                Some(AttachmentSkip::Tail) => {
                    if raw.starts_with('\t') {
                        continue;
                    }
                    self.skip = None;
                }
                None => {}
            }

            let (start, mut text) = match self.pending.take() {
                Some((start, mut joined)) => {
                    joined.push_str(raw);
                    (start, joined)
                }
                None if raw.starts_with(ATTACH_PREFIX) => {
                    tracing::trace!(line = line_num, "Discarding attachment");
                    self.skip = Some(if raw.ends_with(SOFT_WRAP) {
                        AttachmentSkip::Wrapped
                    } else {
                        AttachmentSkip::Tail
                    });
                    continue;
                }
                None => (line_num, raw.to_string()),
            };

            if text.ends_with(SOFT_WRAP) {
                text.pop();
                self.pending = Some((start, text));
                continue;
            }

            if text.is_empty() {
                return Some(Err(ParseError::EmptyLine { line: line_num }));
            }

            if let Some(rest) = text.strip_prefix('\t') {
                return Some(Ok(LogicalLine::Continuation {
                    line: start,
                    text: rest.to_string(),
                }));
            }

            return Some(Ok(LogicalLine::Content { line: start, text }));
        }
    }
}
