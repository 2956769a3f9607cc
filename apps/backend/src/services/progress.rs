//! Persistence adapter around the pure progression engine.
//!
//! Handlers never compute transitions themselves: they load the prior
//! counters through a [`ProgressRepository`], run them through
//! `flashcard_core::progress`, and store the result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashcard_core::progress::{record_answer, self_assess, ProgressCounters, SelfAssessment};
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::ProgressRecord;

/// Storage of per-user flashcard progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, flashcard_id: Uuid) -> Result<Option<ProgressRecord>>;

    async fn save(&self, user_id: Uuid, record: &ProgressRecord) -> Result<()>;

    /// Save only if the card has no progress yet. Returns whether a row was written.
    async fn save_if_missing(&self, user_id: Uuid, record: &ProgressRecord) -> Result<bool>;

    async fn delete_for_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<u64>;

    async fn flashcard_ids(&self, study_set_id: Uuid) -> Result<Vec<Uuid>>;
}

#[async_trait]
impl ProgressRepository for Database {
    async fn find(&self, user_id: Uuid, flashcard_id: Uuid) -> Result<Option<ProgressRecord>> {
        Ok(self
            .get_progress(user_id, flashcard_id)
            .await?
            .map(|row| row.to_record()))
    }

    async fn save(&self, user_id: Uuid, record: &ProgressRecord) -> Result<()> {
        self.upsert_progress(user_id, record).await
    }

    async fn save_if_missing(&self, user_id: Uuid, record: &ProgressRecord) -> Result<bool> {
        self.insert_progress_if_missing(user_id, record).await
    }

    async fn delete_for_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<u64> {
        self.delete_progress_for_set(user_id, study_set_id).await
    }

    async fn flashcard_ids(&self, study_set_id: Uuid) -> Result<Vec<Uuid>> {
        self.get_flashcard_ids(study_set_id).await
    }
}

/// Progress operations for one repository.
pub struct ProgressService<'a, R: ProgressRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: ProgressRepository + ?Sized> ProgressService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Apply an answer to the stored counters and persist the result.
    pub async fn record_answer(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let prior = self.repo.find(user_id, flashcard_id).await?;
        let transition = record_answer(prior.as_ref().map(|p| &p.counters), correct, now);

        let record = ProgressRecord {
            flashcard_id,
            counters: transition.counters,
            last_studied_at: Some(transition.studied_at),
        };
        self.repo.save(user_id, &record).await?;

        tracing::debug!(
            %user_id,
            %flashcard_id,
            correct,
            status = record.counters.status.as_str(),
            "Recorded answer"
        );
        Ok(record)
    }

    /// Set a card's status by hand. Counters are kept.
    pub async fn mark_status(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
        assessment: SelfAssessment,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let prior = self.repo.find(user_id, flashcard_id).await?;
        let record = ProgressRecord {
            flashcard_id,
            counters: self_assess(prior.as_ref().map(|p| &p.counters), assessment),
            last_studied_at: Some(now),
        };
        self.repo.save(user_id, &record).await?;
        Ok(record)
    }

    /// Forget all of the user's progress in a set.
    pub async fn reset_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<u64> {
        let removed = self.repo.delete_for_set(user_id, study_set_id).await?;
        tracing::info!(%user_id, %study_set_id, removed, "Reset set progress");
        Ok(removed)
    }

    /// Create `learning` records for every card without progress.
    pub async fn initialize_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<usize> {
        let mut initialized = 0;
        for flashcard_id in self.repo.flashcard_ids(study_set_id).await? {
            let record = ProgressRecord {
                flashcard_id,
                counters: ProgressCounters::initial_learning(),
                last_studied_at: None,
            };
            if self.repo.save_if_missing(user_id, &record).await? {
                initialized += 1;
            }
        }
        Ok(initialized)
    }
}
