//! Study set endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use flashcard_core::generate_csv;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::import::plan_import;
use crate::AppState;

/// Load a set or fail with 404
pub(crate) async fn load_set(state: &AppState, id: Uuid) -> Result<DbStudySet> {
    state
        .db
        .get_study_set(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Study set not found".to_string()))
}

/// Load a set the caller owns
async fn load_owned_set(state: &AppState, auth: &AuthenticatedUser, id: Uuid) -> Result<DbStudySet> {
    let set = load_set(state, id).await?;
    auth.ensure_owner(&set)?;
    Ok(set)
}

fn validate(request: &StudySetRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if let Some(pos) = request
        .flashcards
        .iter()
        .position(|c| c.term.trim().is_empty() || c.definition.trim().is_empty())
    {
        return Err(ApiError::BadRequest(format!(
            "Flashcard {} needs both a term and a definition",
            pos + 1
        )));
    }
    Ok(())
}

/// GET /api/sets
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StudySetSummary>>> {
    Ok(Json(state.db.list_study_sets().await?))
}

/// GET /api/sets/mine
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<StudySetSummary>>> {
    Ok(Json(state.db.list_study_sets_by_owner(auth.user_id).await?))
}

/// POST /api/sets
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<StudySetRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    validate(&request)?;
    let id = state.db.create_study_set(auth.user_id, &request).await?;

    tracing::info!(
        study_set_id = %id,
        cards = request.flashcards.len(),
        "Created study set"
    );

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/sets/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudySetResponse>> {
    let set = load_set(&state, id).await?;
    let flashcards = state.db.get_flashcards(id).await?;
    Ok(Json(StudySetResponse { set, flashcards }))
}

/// PUT /api/sets/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<StudySetRequest>,
) -> Result<StatusCode> {
    load_owned_set(&state, &auth, id).await?;
    validate(&request)?;
    state.db.update_study_set(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/sets/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    load_owned_set(&state, &auth, id).await?;
    state.db.delete_study_set(id).await?;
    tracing::info!(study_set_id = %id, "Deleted study set");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sets/:id/import
pub async fn import(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>> {
    load_owned_set(&state, &auth, id).await?;
    let plan = plan_import(&request.content)?;
    let imported = state.db.append_flashcards(id, &plan.flashcards).await?;

    tracing::info!(
        study_set_id = %id,
        imported,
        rejected = plan.errors.len(),
        "Imported flashcards"
    );

    Ok(Json(ImportResponse {
        imported,
        errors: plan.errors,
    }))
}

/// GET /api/sets/:id/export
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    load_set(&state, id).await?;
    let cards: Vec<FlashcardInput> = state
        .db
        .get_flashcards(id)
        .await?
        .iter()
        .map(DbFlashcard::to_input)
        .collect();

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        generate_csv(&cards),
    ))
}
