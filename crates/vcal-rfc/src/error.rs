use thiserror::Error;

use crate::rfc::vcal::datetime::FormatError;
use crate::rfc::vcal::parse::ParseError;

/// Import failures that abort the whole document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Record {index}: {source}")]
    Format {
        index: usize,
        #[source]
        source: FormatError,
    },
}

impl ImportError {
    /// Returns the block name carried by an unterminated-block failure.
    #[must_use]
    pub fn unterminated_block(&self) -> Option<&str> {
        match self {
            Self::Parse(ParseError::UnterminatedBlock { name, .. }) => Some(name),
            _ => None,
        }
    }
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;
