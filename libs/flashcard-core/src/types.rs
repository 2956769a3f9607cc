//! Core types for the study set application.

use serde::{Deserialize, Serialize};

/// Term/definition pair as entered by a user or read from CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardInput {
    pub term: String,
    pub definition: String,
}

impl FlashcardInput {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// Outcome of a CSV import. Built once by the parser and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// True when at least one flashcard was produced.
    pub success: bool,
    pub flashcards: Vec<FlashcardInput>,
    pub errors: Vec<String>,
}

/// Flashcard as seen by the study modes.
///
/// The id is opaque to this crate; the backend uses database ids rendered as
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub term: String,
    pub definition: String,
}

impl Card {
    pub fn new(id: impl Into<String>, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// Kind of question in a generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Written,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple-choice",
            Self::TrueFalse => "true-false",
            Self::Written => "written",
        }
    }
}

/// Test generation options chosen by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub question_count: usize,
    pub question_types: Vec<QuestionType>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            question_count: 10,
            question_types: vec![
                QuestionType::MultipleChoice,
                QuestionType::TrueFalse,
                QuestionType::Written,
            ],
        }
    }
}

/// A generated test question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub card: Card,
    /// Expected answer: the definition, or `"true"`/`"false"` for true/false.
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displayed_definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pair_correct: Option<bool>,
}

/// A graded answer in a finished test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAnswer {
    pub question_id: String,
    pub user_answer: String,
    pub is_correct: bool,
}

/// Per-question record saved with a test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAnswerDetail {
    pub question_id: String,
    pub question_type: QuestionType,
    pub term: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
}

/// Match game tile side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Term,
    Definition,
}

/// One tile on the match game board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTile {
    pub id: String,
    pub card_id: String,
    pub content: String,
    pub kind: TileKind,
    pub is_matched: bool,
    pub is_selected: bool,
}
