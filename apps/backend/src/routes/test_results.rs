//! Saved test result endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::sets::load_set;
use crate::AppState;

/// History length when the client does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// POST /api/test-results
pub async fn save(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<SaveTestResultRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    if request.total_questions <= 0 || !(0..=100).contains(&request.percentage) {
        return Err(ApiError::BadRequest("Invalid test result".to_string()));
    }
    load_set(&state, request.study_set_id).await?;

    let id = state.db.insert_test_result(auth.user_id, &request).await?;
    tracing::info!(
        test_result_id = %id,
        study_set_id = %request.study_set_id,
        percentage = request.percentage,
        "Saved test result"
    );

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/test-results
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<TestHistoryQuery>,
) -> Result<Json<Vec<TestResultRecord>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
    let results = state
        .db
        .get_test_history(auth.user_id, query.study_set_id, Some(limit))
        .await?;

    Ok(Json(results.into_iter().map(DbTestResult::to_api).collect()))
}

/// GET /api/test-results/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<TestStatsResponse>> {
    let results = state.db.get_test_history(auth.user_id, None, None).await?;
    Ok(Json(TestStatsResponse::from_results(
        results.into_iter().map(DbTestResult::to_api).collect(),
    )))
}

/// GET /api/test-results/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<TestResultRecord>> {
    let result = state
        .db
        .get_test_result(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Test result not found".to_string()))?;

    Ok(Json(result.to_api()))
}

/// DELETE /api/test-results/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.db.delete_test_result(auth.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Test result not found".to_string()))
    }
}
