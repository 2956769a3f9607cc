//! CSV import and export for flashcards.
//!
//! # Format
//! ```text
//! term,definition
//! Photosynthesis,"Converts light, water and CO2 into sugar"
//! "The ""best"" term",A definition
//! ```
//!
//! The header row is optional. Fields may be wrapped in double quotes, in which
//! case commas are literal and `""` stands for one quote.

use crate::error::ParseError;
use crate::types::{FlashcardInput, ParseResult};

const HEADER: &str = "term,definition";

/// Parse CSV content into flashcards.
///
/// Bad lines are reported in `errors` and skipped; they never abort the import.
/// Line numbers count non-blank lines, header included.
pub fn parse_csv(content: &str) -> ParseResult {
    let mut lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .peekable();

    if let Some((_, first)) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut flashcards = Vec::new();
    let mut errors = Vec::new();

    for (line_num, line) in lines {
        match parse_record(line, line_num) {
            Ok(card) => flashcards.push(card),
            Err(err) => errors.push(err.to_string()),
        }
    }

    ParseResult {
        success: !flashcards.is_empty(),
        flashcards,
        errors,
    }
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("term") || lower.contains("definition")
}

fn parse_record(line: &str, line_num: usize) -> Result<FlashcardInput, ParseError> {
    let fields = split_fields(line.trim());

    let (term, definition) = match fields.as_slice() {
        [term, definition, ..] => (term.trim(), definition.trim()),
        _ => return Err(ParseError::MissingColumns { line: line_num }),
    };

    if term.is_empty() {
        return Err(ParseError::EmptyTerm { line: line_num });
    }
    if definition.is_empty() {
        return Err(ParseError::EmptyDefinition { line: line_num });
    }

    Ok(FlashcardInput::new(term, definition))
}

/// Split one line into fields, honoring double-quote quoting.
///
/// An unterminated quote simply runs to the end of the line.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Serialize flashcards to CSV with a `term,definition` header.
pub fn generate_csv(flashcards: &[FlashcardInput]) -> String {
    let mut rows = Vec::with_capacity(flashcards.len() + 1);
    rows.push(HEADER.to_string());

    for card in flashcards {
        rows.push(format!(
            "{},{}",
            escape_field(&card.term),
            escape_field(&card.definition)
        ));
    }

    rows.join("\n")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
