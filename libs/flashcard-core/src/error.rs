//! Error types for flashcard-core.

use thiserror::Error;

/// Errors reported for a single CSV line during import.
///
/// The `Display` output is the message shown to the user, prefixed with the
/// 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line {line}: Expected at least 2 columns (term, definition)")]
    MissingColumns { line: usize },

    #[error("Line {line}: Term is empty")]
    EmptyTerm { line: usize },

    #[error("Line {line}: Definition is empty")]
    EmptyDefinition { line: usize },
}

impl ParseError {
    /// Line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingColumns { line }
            | Self::EmptyTerm { line }
            | Self::EmptyDefinition { line } => *line,
        }
    }
}
