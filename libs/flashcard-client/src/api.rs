//! HTTP client for the progress endpoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashcard_core::{LearnProgress, MasteryStatus, ProgressCounters};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::sync::PendingWrite;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Retrying will not change the outcome.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, Self::Network(_) | Self::Backend { .. })
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => Self::Backend {
                status: status.as_u16(),
                message,
            },
            s if s.is_client_error() => Self::Rejected {
                status: s.as_u16(),
                message,
            },
            s => Self::Backend {
                status: s.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Server-side progress of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProgress {
    pub flashcard_id: Uuid,
    #[serde(flatten)]
    pub counters: ProgressCounters,
    pub last_studied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFlashcard {
    pub id: Uuid,
    pub term: String,
    pub definition: String,
    pub position: i32,
    pub progress: Option<RemoteProgress>,
}

/// A set's cards with the caller's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetProgress {
    pub study_set_id: Uuid,
    pub flashcards: Vec<RemoteFlashcard>,
    pub progress: LearnProgress,
}

impl SetProgress {
    pub fn counters(&self, flashcard_id: Uuid) -> Option<ProgressCounters> {
        self.flashcards
            .iter()
            .find(|f| f.id == flashcard_id)
            .and_then(|f| f.progress.map(|p| p.counters))
    }
}

#[derive(Debug, Deserialize)]
struct ResetResponse {
    reset: u64,
}

/// Progress operations used by the sync worker.
#[async_trait]
pub trait ProgressApi: Send + Sync + 'static {
    /// Send one queued write.
    async fn apply(&self, write: &PendingWrite) -> Result<(), ClientError>;

    async fn set_progress(&self, study_set_id: Uuid) -> Result<SetProgress, ClientError>;
}

/// Authenticated JSON client for the flashcards backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let resp = request.bearer_auth(&self.token).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, message));
        }

        resp.json().await.map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// POST /api/progress/answer
    pub async fn submit_answer(
        &self,
        flashcard_id: Uuid,
        correct: bool,
    ) -> Result<RemoteProgress, ClientError> {
        let request = self
            .client
            .post(self.url("/api/progress/answer"))
            .json(&json!({ "flashcard_id": flashcard_id, "correct": correct }));
        self.send(request).await
    }

    /// POST /api/progress/mark
    pub async fn mark_status(
        &self,
        flashcard_id: Uuid,
        status: MasteryStatus,
    ) -> Result<RemoteProgress, ClientError> {
        let request = self
            .client
            .post(self.url("/api/progress/mark"))
            .json(&json!({ "flashcard_id": flashcard_id, "status": status }));
        self.send(request).await
    }

    /// POST /api/sets/:id/progress/reset
    pub async fn reset_set_progress(&self, study_set_id: Uuid) -> Result<u64, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/api/sets/{study_set_id}/progress/reset")));
        let body: ResetResponse = self.send(request).await?;
        Ok(body.reset)
    }

    /// GET /api/sets/:id/progress
    pub async fn set_progress(&self, study_set_id: Uuid) -> Result<SetProgress, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/api/sets/{study_set_id}/progress")));
        self.send(request).await
    }
}

#[async_trait]
impl ProgressApi for ApiClient {
    async fn apply(&self, write: &PendingWrite) -> Result<(), ClientError> {
        match *write {
            PendingWrite::Answer {
                flashcard_id,
                correct,
            } => self.submit_answer(flashcard_id, correct).await.map(drop),
            PendingWrite::Mark {
                flashcard_id,
                status,
            } => self.mark_status(flashcard_id, status).await.map(drop),
            PendingWrite::ResetSet { study_set_id } => {
                self.reset_set_progress(study_set_id).await.map(drop)
            }
        }
    }

    async fn set_progress(&self, study_set_id: Uuid) -> Result<SetProgress, ClientError> {
        ApiClient::set_progress(self, study_set_id).await
    }
}
