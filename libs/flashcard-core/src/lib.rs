//! Core flashcard library shared by the backend and its clients.
//!
//! Provides:
//! - CSV import/export of term/definition pairs
//! - Lenient grading of written answers
//! - Mastery progression (new → learning → mastered)
//! - Learn mode, test generation and match game logic

pub mod error;
pub mod matching;
pub mod parser;
pub mod progress;
pub mod shuffle;
pub mod study;
pub mod types;

pub use error::ParseError;
pub use matching::{compare_answers, grade_answer, levenshtein_distance, normalize_answer, MatchResult};
pub use parser::{generate_csv, parse_csv};
pub use progress::{
    next_state, record_answer, self_assess, LearnProgress, MasteryStatus, ProgressCounters,
    ProgressTransition, SelfAssessment,
};
pub use types::{
    Card, FlashcardInput, MatchTile, ParseResult, QuestionType, TestAnswer, TestAnswerDetail,
    TestConfig, TestQuestion, TileKind,
};
