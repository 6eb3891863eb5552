//! Block parser: groups logical lines into one [`FieldMap`] per VEVENT/VTODO.

use super::error::{ParseError, ParseResult};
use super::lexer::{LineUnfolder, LogicalLine};
use crate::rfc::vcal::core::{
    ATTENDEE_KEY, ATTENDEE_STATUS_KEY, DESCRIPTION_KEY, FieldKind, FieldMap, ORGANIZER_KEY,
    TRIGGER_KEY, is_next_item,
};

/// Blocks in document order.
pub type BlockSequence = Vec<FieldMap>;

const CALENDAR: &str = "VCALENDAR";
const ALARM: &str = "VALARM";
const TIMEZONE: &str = "VTIMEZONE";
const ORGANIZER_MARKER: &str = "ORGANIZER";
/// Literal escaped newline removed from committed descriptions.
const ESCAPED_NEWLINE: &str = "\\n";

/// Parses decoded document text into field maps, one per VEVENT/VTODO.
///
/// ## Errors
/// Returns [`ParseError::MissingBegin`] if the first line is not
/// `BEGIN:VCALENDAR`, [`ParseError::EmptyLine`] or
/// [`ParseError::MalformedDelimiter`] on a broken line, and
/// [`ParseError::UnterminatedBlock`] if input ends before `END:VCALENDAR`.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_blocks(input: &str) -> ParseResult<BlockSequence> {
    tracing::debug!("Parsing vCalendar document");

    let mut lines = LineUnfolder::new(input);

    match lines.next().transpose()? {
        Some(LogicalLine::Content { ref text, .. }) if text == "BEGIN:VCALENDAR" => {}
        Some(first) => {
            tracing::warn!(line = first.line(), "Document does not start with BEGIN:VCALENDAR");
            return Err(ParseError::MissingBegin { line: first.line() });
        }
        None => {
            tracing::warn!("Empty vCalendar input");
            return Err(ParseError::MissingBegin { line: 1 });
        }
    }

    let mut parser = BlockParser::new();
    for line in lines.by_ref() {
        if parser.feed(line?)? == Step::Done {
            tracing::debug!(count = parser.blocks.len(), "vCalendar document parsed");
            return Ok(parser.blocks);
        }
    }

    let name = parser
        .open
        .last()
        .cloned()
        .unwrap_or_else(|| CALENDAR.to_string());
    tracing::warn!(block = %name, "Input ended inside an open block");
    Err(ParseError::UnterminatedBlock {
        name,
        line: lines.last_line(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Scanning,
    /// Inside a VALARM sub-block; DESCRIPTION lines belong to the alarm.
    InAlarm,
    /// Collecting a multi-line DESCRIPTION value.
    InDescription(String),
}

#[derive(Debug)]
struct BlockParser {
    blocks: BlockSequence,
    current: FieldMap,
    state: State,
    /// Blocks opened below VCALENDAR, innermost last.
    open: Vec<String>,
    /// Key the next tab continuation extends.
    last_field: Option<String>,
}

impl BlockParser {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: FieldMap::new(),
            state: State::Scanning,
            open: Vec::new(),
            last_field: None,
        }
    }

    fn feed(&mut self, line: LogicalLine) -> ParseResult<Step> {
        if let State::InDescription(buffer) = &mut self.state {
            match &line {
                LogicalLine::Continuation { text, .. } => {
                    buffer.push_str(text);
                    return Ok(Step::Continue);
                }
                LogicalLine::Content { text, .. } if !is_next_item(text) => {
                    buffer.push('\n');
                    buffer.push_str(text);
                    return Ok(Step::Continue);
                }
                LogicalLine::Content { .. } => self.commit_description(),
            }
        }

        match line {
            LogicalLine::Continuation { line, text } => {
                self.continue_field(line, &text);
                Ok(Step::Continue)
            }
            LogicalLine::Content { line, text } => self.feed_content(line, &text),
        }
    }

    fn feed_content(&mut self, line: usize, text: &str) -> ParseResult<Step> {
        let Some((field, value)) = text.split_once(':') else {
            tracing::trace!(line, "Ignoring line without a field delimiter");
            return Ok(Step::Continue);
        };
        if field.is_empty() {
            return Err(ParseError::MalformedDelimiter { line });
        }

        match FieldKind::classify(field) {
            FieldKind::Begin => {
                self.begin(value);
                return Ok(Step::Continue);
            }
            FieldKind::End => return Ok(self.end(value)),
            _ if self.in_timezone() => {
                self.last_field = None;
                return Ok(Step::Continue);
            }
            FieldKind::Trigger => self.store(TRIGGER_KEY, value),
            FieldKind::Attendee => self.add_attendee(field, value),
            FieldKind::Description if self.state == State::InAlarm => {
                tracing::trace!(line, "Skipping alarm description");
                self.last_field = None;
            }
            FieldKind::Description => {
                self.state = State::InDescription(value.to_string());
                self.last_field = None;
            }
            _ => self.store(field, value),
        }

        Ok(Step::Continue)
    }

    fn begin(&mut self, name: &str) {
        let name = name.to_ascii_uppercase();
        if name == ALARM {
            self.state = State::InAlarm;
        }
        self.open.push(name);
        self.last_field = None;
    }

    fn end(&mut self, name: &str) -> Step {
        let name = name.to_ascii_uppercase();
        if let Some(pos) = self.open.iter().rposition(|open| *open == name) {
            self.open.truncate(pos);
        }
        self.last_field = None;

        match name.as_str() {
            ALARM if self.state == State::InAlarm => self.state = State::Scanning,
            "VEVENT" | "VTODO" => {
                let block = std::mem::take(&mut self.current);
                tracing::trace!(fields = block.len(), "Block finished");
                self.blocks.push(block);
            }
            CALENDAR => return Step::Done,
            _ => {}
        }
        Step::Continue
    }

    fn in_timezone(&self) -> bool {
        self.open.iter().any(|name| name == TIMEZONE)
    }

    fn store(&mut self, key: &str, value: &str) {
        self.current.append(key, value);
        self.last_field = Some(key.to_string());
    }

    fn continue_field(&mut self, line: usize, text: &str) {
        let extended = self
            .last_field
            .as_deref()
            .is_some_and(|field| self.current.extend_value(field, text));
        if !extended {
            tracing::trace!(line, "Continuation line with no field to extend");
        }
    }

    /// Records one attendee and its status, keeping both lists parallel.
    ///
    /// The status is the field-name suffix after the last `=`.
    fn add_attendee(&mut self, field: &str, value: &str) {
        if field.to_ascii_uppercase().contains(ORGANIZER_MARKER) {
            self.current.set(ORGANIZER_KEY, value);
        }

        let status = field
            .rfind('=')
            .map(|pos| &field[pos + 1..])
            .and_then(|suffix| suffix.split(';').next())
            .unwrap_or_default();

        self.current.append(ATTENDEE_KEY, value);
        self.current.append(ATTENDEE_STATUS_KEY, status);
        self.last_field = None;
    }

    fn commit_description(&mut self) {
        if let State::InDescription(buffer) = std::mem::replace(&mut self.state, State::Scanning) {
            self.current
                .set(DESCRIPTION_KEY, buffer.replace(ESCAPED_NEWLINE, ""));
        }
    }
}
