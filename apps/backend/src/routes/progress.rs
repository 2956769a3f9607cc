//! Learning progress endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use flashcard_core::progress::SelfAssessment;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::sets::load_set;
use crate::services::progress::ProgressService;
use crate::AppState;

/// GET /api/sets/:id/progress
pub async fn for_set(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<SetProgressResponse>> {
    load_set(&state, id).await?;
    let cards = state.db.get_flashcards(id).await?;
    let mut progress: HashMap<Uuid, ProgressRecord> = state
        .db
        .get_progress_for_set(auth.user_id, id)
        .await?
        .iter()
        .map(|row| (row.flashcard_id, row.to_record()))
        .collect();

    let flashcards: Vec<FlashcardWithProgress> = cards
        .into_iter()
        .map(|flashcard| FlashcardWithProgress {
            progress: progress.remove(&flashcard.id),
            flashcard,
        })
        .collect();

    let tally = LearnProgress::tally(
        flashcards
            .iter()
            .map(|f| f.progress.map(|p| p.counters.status)),
    );

    Ok(Json(SetProgressResponse {
        study_set_id: id,
        flashcards,
        progress: tally,
    }))
}

/// POST /api/progress/answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<ProgressRecord>> {
    ensure_flashcard(&state, request.flashcard_id).await?;

    let record = ProgressService::new(state.db.as_ref())
        .record_answer(auth.user_id, request.flashcard_id, request.correct, Utc::now())
        .await?;

    Ok(Json(record))
}

/// POST /api/progress/mark
pub async fn mark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<MarkRequest>,
) -> Result<Json<ProgressRecord>> {
    let assessment = match request.status {
        MasteryStatus::Learning => SelfAssessment::StillLearning,
        MasteryStatus::Mastered => SelfAssessment::AlreadyKnow,
        MasteryStatus::New => {
            return Err(ApiError::BadRequest(
                "Status must be learning or mastered".to_string(),
            ))
        }
    };
    ensure_flashcard(&state, request.flashcard_id).await?;

    let record = ProgressService::new(state.db.as_ref())
        .mark_status(auth.user_id, request.flashcard_id, assessment, Utc::now())
        .await?;

    Ok(Json(record))
}

/// POST /api/sets/:id/progress/reset
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResetResponse>> {
    load_set(&state, id).await?;
    let reset = ProgressService::new(state.db.as_ref())
        .reset_set(auth.user_id, id)
        .await?;
    Ok(Json(ResetResponse { reset }))
}

/// POST /api/sets/:id/progress/initialize
pub async fn initialize(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<InitializeResponse>> {
    load_set(&state, id).await?;
    let initialized = ProgressService::new(state.db.as_ref())
        .initialize_set(auth.user_id, id)
        .await?;
    Ok(Json(InitializeResponse { initialized }))
}

/// GET /api/progress
pub async fn overall(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<OverallProgressResponse>> {
    let rows = state.db.get_progress_by_set(auth.user_id).await?;

    let mut overall = LearnProgress::default();
    let sets: Vec<SetProgressSummary> = rows
        .iter()
        .map(|row| {
            let progress = row.to_tally();
            overall.merge(&progress);
            SetProgressSummary {
                study_set_id: row.study_set_id,
                title: row.title.clone(),
                progress,
            }
        })
        .collect();

    Ok(Json(OverallProgressResponse { overall, sets }))
}

async fn ensure_flashcard(state: &AppState, flashcard_id: Uuid) -> Result<()> {
    state
        .db
        .get_flashcard(flashcard_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Flashcard not found".to_string()))
}
