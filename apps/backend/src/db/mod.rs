//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, name: Option<&str>) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_seen_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // === Study Set Repository ===

    /// All study sets, most recently updated first
    pub async fn list_study_sets(&self) -> Result<Vec<StudySetSummary>> {
        let sets = sqlx::query_as::<_, StudySetSummary>(
            r#"
            SELECT s.id, s.owner_id, s.title, s.description,
                   COUNT(f.id) as card_count, s.created_at, s.updated_at
            FROM study_sets s
            LEFT JOIN flashcards f ON f.study_set_id = s.id
            GROUP BY s.id
            ORDER BY s.updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }

    /// Study sets owned by a user
    pub async fn list_study_sets_by_owner(&self, owner_id: Uuid) -> Result<Vec<StudySetSummary>> {
        let sets = sqlx::query_as::<_, StudySetSummary>(
            r#"
            SELECT s.id, s.owner_id, s.title, s.description,
                   COUNT(f.id) as card_count, s.created_at, s.updated_at
            FROM study_sets s
            LEFT JOIN flashcards f ON f.study_set_id = s.id
            WHERE s.owner_id = $1
            GROUP BY s.id
            ORDER BY s.updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }

    pub async fn get_study_set(&self, id: Uuid) -> Result<Option<DbStudySet>> {
        let set = sqlx::query_as::<_, DbStudySet>(
            r#"
            SELECT id, owner_id, title, description, created_at, updated_at
            FROM study_sets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(set)
    }

    /// Cards of a set in display order
    pub async fn get_flashcards(&self, study_set_id: Uuid) -> Result<Vec<DbFlashcard>> {
        let cards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, study_set_id, term, definition, position, created_at
            FROM flashcards
            WHERE study_set_id = $1
            ORDER BY position
            "#,
        )
        .bind(study_set_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    pub async fn get_flashcard(&self, id: Uuid) -> Result<Option<DbFlashcard>> {
        let card = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, study_set_id, term, definition, position, created_at
            FROM flashcards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Create a set and its cards in one transaction
    pub async fn create_study_set(&self, owner_id: Uuid, request: &StudySetRequest) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO study_sets (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&request.title)
        .bind(&request.description)
        .fetch_one(&mut *tx)
        .await?;

        insert_flashcards(&mut tx, id, &request.flashcards, 0).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Replace a set's metadata and all of its cards
    pub async fn update_study_set(&self, id: Uuid, request: &StudySetRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE study_sets
            SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM flashcards WHERE study_set_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_flashcards(&mut tx, id, &request.flashcards, 0).await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn delete_study_set(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM study_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append cards after the set's current last position
    pub async fn append_flashcards(&self, study_set_id: Uuid, cards: &[FlashcardInput]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let max_position: Option<i32> =
            sqlx::query_scalar("SELECT MAX(position) FROM flashcards WHERE study_set_id = $1")
                .bind(study_set_id)
                .fetch_one(&mut *tx)
                .await?;

        let start = max_position.map_or(0, |p| p + 1);
        let count = insert_flashcards(&mut tx, study_set_id, cards, start).await?;

        sqlx::query("UPDATE study_sets SET updated_at = NOW() WHERE id = $1")
            .bind(study_set_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(count)
    }

    // === Progress Repository ===

    pub async fn get_progress(&self, user_id: Uuid, flashcard_id: Uuid) -> Result<Option<DbProgress>> {
        let progress = sqlx::query_as::<_, DbProgress>(
            r#"
            SELECT id, user_id, flashcard_id, status, correct_count, incorrect_count,
                   last_studied_at, created_at
            FROM user_flashcard_progress
            WHERE user_id = $1 AND flashcard_id = $2
            "#,
        )
        .bind(user_id)
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Progress rows for every card of a set that the user has touched
    pub async fn get_progress_for_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<Vec<DbProgress>> {
        let progress = sqlx::query_as::<_, DbProgress>(
            r#"
            SELECT p.id, p.user_id, p.flashcard_id, p.status, p.correct_count,
                   p.incorrect_count, p.last_studied_at, p.created_at
            FROM user_flashcard_progress p
            JOIN flashcards f ON f.id = p.flashcard_id
            WHERE p.user_id = $1 AND f.study_set_id = $2
            "#,
        )
        .bind(user_id)
        .bind(study_set_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Insert or overwrite the progress of one card
    pub async fn upsert_progress(&self, user_id: Uuid, record: &ProgressRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_flashcard_progress (user_id, flashcard_id, status, correct_count,
                                                 incorrect_count, last_studied_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, flashcard_id) DO UPDATE SET
                status = EXCLUDED.status,
                correct_count = EXCLUDED.correct_count,
                incorrect_count = EXCLUDED.incorrect_count,
                last_studied_at = EXCLUDED.last_studied_at
            "#,
        )
        .bind(user_id)
        .bind(record.flashcard_id)
        .bind(record.counters.status.as_str())
        .bind(record.counters.correct_count as i32)
        .bind(record.counters.incorrect_count as i32)
        .bind(record.last_studied_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the user's progress for every card in a set
    pub async fn delete_progress_for_set(&self, user_id: Uuid, study_set_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_flashcard_progress
            WHERE user_id = $1
              AND flashcard_id IN (SELECT id FROM flashcards WHERE study_set_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(study_set_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Card ids of a set
    pub async fn get_flashcard_ids(&self, study_set_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM flashcards WHERE study_set_id = $1 ORDER BY position")
            .bind(study_set_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Insert a progress row only when none exists yet
    pub async fn insert_progress_if_missing(&self, user_id: Uuid, record: &ProgressRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_flashcard_progress (user_id, flashcard_id, status, correct_count,
                                                 incorrect_count, last_studied_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, flashcard_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(record.flashcard_id)
        .bind(record.counters.status.as_str())
        .bind(record.counters.correct_count as i32)
        .bind(record.counters.incorrect_count as i32)
        .bind(record.last_studied_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Per-set status counts over the user's progress records
    pub async fn get_progress_by_set(&self, user_id: Uuid) -> Result<Vec<SetProgressRow>> {
        let rows = sqlx::query_as::<_, SetProgressRow>(
            r#"
            SELECT s.id as study_set_id, s.title,
                   COUNT(*) as total,
                   COUNT(*) FILTER (WHERE p.status = 'new') as new_count,
                   COUNT(*) FILTER (WHERE p.status = 'learning') as learning,
                   COUNT(*) FILTER (WHERE p.status = 'mastered') as mastered
            FROM user_flashcard_progress p
            JOIN flashcards f ON f.id = p.flashcard_id
            JOIN study_sets s ON s.id = f.study_set_id
            WHERE p.user_id = $1
            GROUP BY s.id, s.title
            ORDER BY s.title
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // === Test Result Repository ===

    pub async fn insert_test_result(&self, user_id: Uuid, request: &SaveTestResultRequest) -> Result<Uuid> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO test_results (user_id, study_set_id, score, total_questions, percentage,
                                      question_types, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(request.study_set_id)
        .bind(request.score)
        .bind(request.total_questions)
        .bind(request.percentage)
        .bind(Json(&request.question_types))
        .bind(Json(&request.answers))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Saved results, newest first, optionally for one set
    pub async fn get_test_history(
        &self,
        user_id: Uuid,
        study_set_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<DbTestResult>> {
        let results = sqlx::query_as::<_, DbTestResult>(
            r#"
            SELECT r.id, r.user_id, r.study_set_id, s.title as study_set_title, r.score,
                   r.total_questions, r.percentage, r.question_types, r.answers, r.completed_at
            FROM test_results r
            LEFT JOIN study_sets s ON s.id = r.study_set_id
            WHERE r.user_id = $1 AND ($2::UUID IS NULL OR r.study_set_id = $2)
            ORDER BY r.completed_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(study_set_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    pub async fn get_test_result(&self, user_id: Uuid, id: Uuid) -> Result<Option<DbTestResult>> {
        let result = sqlx::query_as::<_, DbTestResult>(
            r#"
            SELECT r.id, r.user_id, r.study_set_id, s.title as study_set_title, r.score,
                   r.total_questions, r.percentage, r.question_types, r.answers, r.completed_at
            FROM test_results r
            LEFT JOIN study_sets s ON s.id = r.study_set_id
            WHERE r.user_id = $1 AND r.id = $2
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn delete_test_result(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM test_results WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert cards with consecutive positions starting at `start`
async fn insert_flashcards(
    tx: &mut Transaction<'_, Postgres>,
    study_set_id: Uuid,
    cards: &[FlashcardInput],
    start: i32,
) -> Result<usize> {
    for (offset, card) in cards.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO flashcards (study_set_id, term, definition, position)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(study_set_id)
        .bind(&card.term)
        .bind(&card.definition)
        .bind(start + offset as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(cards.len())
}
