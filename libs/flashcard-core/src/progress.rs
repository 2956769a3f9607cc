//! Mastery progression for a single (user, flashcard) pair.
//!
//! Cards move between three states: `new` (never answered), `learning` and
//! `mastered`. A correct answer on the very first attempt masters a card
//! immediately; otherwise two accumulated correct answers are needed. Any
//! incorrect answer puts the card back into `learning`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correct answers needed to master a card after the first attempt.
pub const MASTERY_CORRECT_COUNT: u32 = 2;

/// Learning status of a flashcard for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryStatus {
    #[default]
    New,
    Learning,
    Mastered,
}

impl MasteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }

    /// Status of a card given its progress record, if any.
    pub fn of(counters: Option<&ProgressCounters>) -> Self {
        counters.map(|c| c.status).unwrap_or_default()
    }
}

/// Answer counters and status for a (user, flashcard) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounters {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub status: MasteryStatus,
}

impl ProgressCounters {
    /// Counters written when progress is initialized for a whole set.
    pub fn initial_learning() -> Self {
        Self {
            status: MasteryStatus::Learning,
            ..Self::default()
        }
    }

    fn has_answers(&self) -> bool {
        self.correct_count > 0 || self.incorrect_count > 0
    }
}

/// Manual classification of a card without answering a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfAssessment {
    StillLearning,
    AlreadyKnow,
}

impl SelfAssessment {
    pub fn status(self) -> MasteryStatus {
        match self {
            Self::StillLearning => MasteryStatus::Learning,
            Self::AlreadyKnow => MasteryStatus::Mastered,
        }
    }
}

/// Counters to persist after an answer, stamped with the study time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTransition {
    pub counters: ProgressCounters,
    pub studied_at: DateTime<Utc>,
}

/// Compute the next counters after an answer.
///
/// `prior` is `None` when the user has never interacted with the card.
pub fn next_state(prior: Option<&ProgressCounters>, correct: bool) -> ProgressCounters {
    let prior = prior.copied().unwrap_or_default();
    let is_first_try = !prior.has_answers();

    if correct {
        let correct_count = prior.correct_count + 1;
        let status = if correct_count >= MASTERY_CORRECT_COUNT || is_first_try {
            MasteryStatus::Mastered
        } else {
            MasteryStatus::Learning
        };
        ProgressCounters {
            correct_count,
            incorrect_count: prior.incorrect_count,
            status,
        }
    } else {
        ProgressCounters {
            correct_count: prior.correct_count,
            incorrect_count: prior.incorrect_count + 1,
            status: MasteryStatus::Learning,
        }
    }
}

/// [`next_state`] plus the "last studied" timestamp.
pub fn record_answer(
    prior: Option<&ProgressCounters>,
    correct: bool,
    now: DateTime<Utc>,
) -> ProgressTransition {
    ProgressTransition {
        counters: next_state(prior, correct),
        studied_at: now,
    }
}

/// Apply a manual self-assessment. Counters are left untouched.
pub fn self_assess(prior: Option<&ProgressCounters>, assessment: SelfAssessment) -> ProgressCounters {
    ProgressCounters {
        status: assessment.status(),
        ..prior.copied().unwrap_or_default()
    }
}

/// Count of cards per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnProgress {
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
    pub total: usize,
}

impl LearnProgress {
    /// Tally statuses. Cards without a record count as new.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Option<MasteryStatus>>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut acc, status| {
                acc.add(status.unwrap_or_default());
                acc
            })
    }

    pub fn add(&mut self, status: MasteryStatus) {
        self.total += 1;
        match status {
            MasteryStatus::New => self.new += 1,
            MasteryStatus::Learning => self.learning += 1,
            MasteryStatus::Mastered => self.mastered += 1,
        }
    }

    /// Combine with the tally of another set.
    pub fn merge(&mut self, other: &LearnProgress) {
        self.new += other.new;
        self.learning += other.learning;
        self.mastered += other.mastered;
        self.total += other.total;
    }
}
