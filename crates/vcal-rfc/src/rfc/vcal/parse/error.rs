//! vCalendar parse error types.

use thiserror::Error;

/// Result type for document parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// A failure that invalidates the block structure of the whole document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first line is not `BEGIN:VCALENDAR`.
    #[error("line {line}: document must begin with BEGIN:VCALENDAR")]
    MissingBegin { line: usize },

    /// A logical line with no content.
    #[error("line {line}: empty content line")]
    EmptyLine { line: usize },

    /// A `:` with no field name in front of it.
    #[error("line {line}: missing field name before ':'")]
    MalformedDelimiter { line: usize },

    /// Input ended before `END:VCALENDAR`.
    #[error("unterminated block {name}: input ended at line {line}")]
    UnterminatedBlock { name: String, line: usize },
}

impl ParseError {
    /// Line number the error refers to (1-based).
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::MissingBegin { line }
            | Self::EmptyLine { line }
            | Self::MalformedDelimiter { line }
            | Self::UnterminatedBlock { line, .. } => *line,
        }
    }

    /// Returns whether this is a structural error (as opposed to an
    /// unterminated block).
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::UnterminatedBlock { .. })
    }
}
