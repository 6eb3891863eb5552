//! vCalendar parsing.
//!
//! - [`LineUnfolder`]: joins soft-wrapped lines and drops attachments
//! - [`parse_blocks`]: groups logical lines into one [`FieldMap`] per block
//!
//! [`FieldMap`]: crate::rfc::vcal::core::FieldMap

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseResult};
pub use lexer::{LineUnfolder, LogicalLine};
pub use parser::{BlockSequence, parse_blocks};
