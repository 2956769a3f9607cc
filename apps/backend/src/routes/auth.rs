//! Bearer token authentication

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::DbStudySet;
use crate::AppState;

/// Authenticated user stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token: String,
}

impl AuthenticatedUser {
    /// Ownership gate for study set writes
    pub fn ensure_owner(&self, set: &DbStudySet) -> Result<()> {
        if set.owner_id == self.user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Only the owner can modify this study set".to_string(),
            ))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let header =
        header.ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))
}

/// Auth middleware - resolves the bearer token to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    )?
    .to_string();

    let user = state
        .db
        .get_user_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid user token".to_string()))?;

    state.db.update_last_seen(user.id).await?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        token,
    });

    Ok(next.run(request).await)
}
