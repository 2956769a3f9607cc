//! Database models and API types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from flashcard-core
pub use flashcard_core::types::{
    Card, FlashcardInput, MatchTile, TestAnswerDetail, TestConfig, TestQuestion,
};
pub use flashcard_core::{LearnProgress, MasteryStatus, ProgressCounters};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Study set row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudySet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Study set listing entry with its card count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySetSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub card_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flashcard stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFlashcard {
    pub id: Uuid,
    pub study_set_id: Uuid,
    pub term: String,
    pub definition: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl DbFlashcard {
    /// Convert to the card type used by the study modes
    pub fn to_core_card(&self) -> Card {
        Card::new(self.id.to_string(), &self.term, &self.definition)
    }

    pub fn to_input(&self) -> FlashcardInput {
        FlashcardInput::new(&self.term, &self.definition)
    }
}

/// Progress row for a (user, flashcard) pair
#[derive(Debug, Clone, FromRow)]
pub struct DbProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flashcard_id: Uuid,
    pub status: String,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub last_studied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DbProgress {
    /// Convert to API record. Unknown statuses read as `new`.
    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord {
            flashcard_id: self.flashcard_id,
            counters: ProgressCounters {
                correct_count: self.correct_count.max(0) as u32,
                incorrect_count: self.incorrect_count.max(0) as u32,
                status: MasteryStatus::parse(&self.status).unwrap_or_default(),
            },
            last_studied_at: self.last_studied_at,
        }
    }
}

/// Saved test result row, joined with the set title
#[derive(Debug, Clone, FromRow)]
pub struct DbTestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub study_set_id: Uuid,
    pub study_set_title: Option<String>,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub question_types: Json<BTreeMap<String, u32>>,
    pub answers: Json<Vec<TestAnswerDetail>>,
    pub completed_at: DateTime<Utc>,
}

impl DbTestResult {
    pub fn to_api(self) -> TestResultRecord {
        TestResultRecord {
            id: self.id,
            study_set_id: self.study_set_id,
            study_set_title: self.study_set_title,
            score: self.score,
            total_questions: self.total_questions,
            percentage: self.percentage,
            question_types: self.question_types.0,
            answers: self.answers.0,
            completed_at: self.completed_at,
        }
    }
}

/// Per-set counts of one user's progress records.
///
/// Cards the user never studied have no record and are not counted.
#[derive(Debug, Clone, FromRow)]
pub struct SetProgressRow {
    pub study_set_id: Uuid,
    pub title: String,
    pub total: i64,
    pub new_count: i64,
    pub learning: i64,
    pub mastered: i64,
}

impl SetProgressRow {
    pub fn to_tally(&self) -> LearnProgress {
        let count = |n: i64| n.max(0) as usize;
        LearnProgress {
            new: count(self.new_count),
            learning: count(self.learning),
            mastered: count(self.mastered),
            total: count(self.total),
        }
    }
}

// === API Types ===

/// Progress of one flashcard as exchanged with clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub flashcard_id: Uuid,
    #[serde(flatten)]
    pub counters: ProgressCounters,
    pub last_studied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

/// Body for creating or replacing a study set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySetRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub flashcards: Vec<FlashcardInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudySetResponse {
    #[serde(flatten)]
    pub set: DbStudySet,
    pub flashcards: Vec<DbFlashcard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Flashcard with the caller's progress, if any
#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardWithProgress {
    #[serde(flatten)]
    pub flashcard: DbFlashcard,
    pub progress: Option<ProgressRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetProgressResponse {
    pub study_set_id: Uuid,
    pub flashcards: Vec<FlashcardWithProgress>,
    pub progress: LearnProgress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub flashcard_id: Uuid,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkRequest {
    pub flashcard_id: Uuid,
    pub status: MasteryStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub reset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub initialized: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetProgressSummary {
    pub study_set_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub progress: LearnProgress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverallProgressResponse {
    pub overall: LearnProgress,
    pub sets: Vec<SetProgressSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedTestResponse {
    pub study_set_id: Uuid,
    pub questions: Vec<TestQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchBoardResponse {
    pub study_set_id: Uuid,
    pub total_pairs: usize,
    pub tiles: Vec<MatchTile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTestResultRequest {
    pub study_set_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    #[serde(default)]
    pub question_types: BTreeMap<String, u32>,
    #[serde(default)]
    pub answers: Vec<TestAnswerDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultRecord {
    pub id: Uuid,
    pub study_set_id: Uuid,
    pub study_set_title: Option<String>,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub question_types: BTreeMap<String, u32>,
    pub answers: Vec<TestAnswerDetail>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TestHistoryQuery {
    pub study_set_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Aggregate statistics over a user's saved tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStatsResponse {
    pub total_tests: usize,
    pub average_score: i32,
    pub best_score: i32,
    pub recent_tests: Vec<TestResultRecord>,
}

/// Tests shown in the stats "recent" list.
pub const RECENT_TEST_COUNT: usize = 5;

impl TestStatsResponse {
    /// Build stats from results ordered newest first.
    pub fn from_results(results: Vec<TestResultRecord>) -> Self {
        if results.is_empty() {
            return Self {
                total_tests: 0,
                average_score: 0,
                best_score: 0,
                recent_tests: Vec::new(),
            };
        }

        let total: i64 = results.iter().map(|r| i64::from(r.percentage)).sum();
        let average_score = (total as f64 / results.len() as f64).round() as i32;
        let best_score = results.iter().map(|r| r.percentage).max().unwrap_or(0);

        Self {
            total_tests: results.len(),
            average_score,
            best_score,
            recent_tests: results.into_iter().take(RECENT_TEST_COUNT).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(percentage: i32) -> TestResultRecord {
        TestResultRecord {
            id: Uuid::new_v4(),
            study_set_id: Uuid::new_v4(),
            study_set_title: Some("Spanish".to_string()),
            score: 0,
            total_questions: 10,
            percentage,
            question_types: BTreeMap::new(),
            answers: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_empty() {
        let stats = TestStatsResponse::from_results(Vec::new());
        assert_eq!(stats.total_tests, 0);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.best_score, 0);
        assert!(stats.recent_tests.is_empty());
    }

    #[test]
    fn test_stats_average_is_rounded() {
        let stats = TestStatsResponse::from_results(vec![result(100), result(67), result(50)]);
        // 217 / 3 = 72.33
        assert_eq!(stats.average_score, 72);
        assert_eq!(stats.best_score, 100);
        assert_eq!(stats.total_tests, 3);
    }

    #[test]
    fn test_stats_keeps_five_most_recent() {
        let results: Vec<_> = (0..8).map(|i| result(i * 10)).collect();
        let first = results[0].id;
        let stats = TestStatsResponse::from_results(results);
        assert_eq!(stats.recent_tests.len(), RECENT_TEST_COUNT);
        assert_eq!(stats.recent_tests[0].id, first);
    }

    #[test]
    fn test_progress_row_unknown_status_reads_as_new() {
        let row = DbProgress {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            flashcard_id: Uuid::new_v4(),
            status: "archived".to_string(),
            correct_count: 3,
            incorrect_count: -1,
            last_studied_at: None,
            created_at: Utc::now(),
        };
        let record = row.to_record();
        assert_eq!(record.counters.status, MasteryStatus::New);
        assert_eq!(record.counters.correct_count, 3);
        assert_eq!(record.counters.incorrect_count, 0);
    }

    #[test]
    fn test_set_progress_tally() {
        let row = SetProgressRow {
            study_set_id: Uuid::new_v4(),
            title: "Biology".to_string(),
            total: 7,
            new_count: 0,
            learning: 3,
            mastered: 4,
        };
        let tally = row.to_tally();
        assert_eq!(tally.new, 0);
        assert_eq!(tally.learning, 3);
        assert_eq!(tally.total, 7);
    }

    #[test]
    fn test_progress_record_flattens_counters() {
        let record = ProgressRecord {
            flashcard_id: Uuid::nil(),
            counters: ProgressCounters::initial_learning(),
            last_studied_at: None,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["status"], "learning");
        assert_eq!(json["correct_count"], 0);
    }
}
