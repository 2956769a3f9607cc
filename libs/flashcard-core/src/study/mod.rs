//! Study mode logic: learn sessions, generated tests and the match game.
//!
//! Everything here takes an explicit random number generator so callers can
//! seed it in tests.

pub mod learn;
pub mod match_game;

pub use learn::{LearnCard, LearnQuestion, LearnSession};
pub use match_game::{MatchGame, MatchOutcome, MAX_MATCH_PAIRS, MISMATCH_PENALTY_MS};
pub use test::{generate_test, grade_test, TestResult};

/// Distractor count for multiple-choice questions.
pub const DISTRACTOR_COUNT: usize = 3;
