//! Background delivery of progress writes.
//!
//! Study screens update their local state right away (see
//! `flashcard_core::next_state`) and hand the write to [`ProgressSync`]. A
//! single worker task sends writes in order, retrying transient failures with
//! exponential backoff. Writes that cannot be delivered are kept in a failure
//! list until the caller retries them or reconciles with the server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flashcard_core::MasteryStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::{ApiClient, ClientError, ProgressApi, SetProgress};

/// Retry settings for queued writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per write, the first one included.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(32);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Connection settings for a sync worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub base_url: String,
    pub token: String,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// A progress write waiting to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingWrite {
    Answer { flashcard_id: Uuid, correct: bool },
    Mark { flashcard_id: Uuid, status: MasteryStatus },
    ResetSet { study_set_id: Uuid },
}

/// A write that was given up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedWrite {
    pub write: PendingWrite,
    pub error: String,
    pub attempts: u32,
}

/// Worker state for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncStatus {
    Idle,
    Syncing { pending: usize },
    Failed { failed: usize, last_error: String },
}

enum Command {
    Write(PendingWrite),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background sync worker.
pub struct ProgressSync {
    api: Arc<dyn ProgressApi>,
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SyncStatus>,
    failures: Arc<Mutex<Vec<FailedWrite>>>,
    pending: Arc<AtomicUsize>,
    worker: JoinHandle<()>,
}

impl ProgressSync {
    /// Start a worker. Must be called inside a tokio runtime.
    pub fn spawn(api: impl ProgressApi, policy: RetryPolicy) -> Self {
        let api: Arc<dyn ProgressApi> = Arc::new(api);
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SyncStatus::Idle);
        let failures = Arc::new(Mutex::new(Vec::new()));
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(run_worker(
            api.clone(),
            policy,
            rx,
            status_tx,
            failures.clone(),
            pending.clone(),
        ));

        Self {
            api,
            tx,
            status,
            failures,
            pending,
            worker,
        }
    }

    /// Start a worker talking to the backend over HTTP.
    pub fn from_config(config: SyncConfig) -> Self {
        Self::spawn(ApiClient::new(config.base_url, config.token), config.retry)
    }

    /// Queue a write. Never blocks.
    pub fn enqueue(&self, write: PendingWrite) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Command::Write(write)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::error!(?write, "Sync worker stopped; write dropped");
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receiver that sees every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    pub async fn failures(&self) -> Vec<FailedWrite> {
        self.failures.lock().await.clone()
    }

    /// Re-queue every failed write. Returns how many were queued.
    pub async fn retry_failed(&self) -> usize {
        let failed = std::mem::take(&mut *self.failures.lock().await);
        let count = failed.len();
        for failure in failed {
            self.enqueue(failure.write);
        }
        count
    }

    /// Wait until everything queued so far has been processed.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Drain pending writes, then fetch the server's view of a set.
    ///
    /// Callers replace their optimistic state with the result.
    pub async fn reconcile(&self, study_set_id: Uuid) -> Result<SetProgress, ClientError> {
        self.flush().await;
        self.api.set_progress(study_set_id).await
    }

    /// Stop accepting writes, finish the queue and return what failed.
    pub async fn shutdown(self) -> Vec<FailedWrite> {
        let Self {
            tx,
            worker,
            failures,
            ..
        } = self;
        drop(tx);
        if let Err(e) = worker.await {
            tracing::error!("Sync worker panicked: {}", e);
        }
        // The guard borrows `failures`; bind it so it drops first.
        let failed = failures.lock().await.clone();
        failed
    }
}

async fn run_worker(
    api: Arc<dyn ProgressApi>,
    policy: RetryPolicy,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<SyncStatus>,
    failures: Arc<Mutex<Vec<FailedWrite>>>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(command) = rx.recv().await {
        let write = match command {
            Command::Write(write) => write,
            Command::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        status_tx.send_replace(SyncStatus::Syncing {
            pending: pending.load(Ordering::SeqCst),
        });

        if let Err(failed) = deliver(api.as_ref(), &policy, write).await {
            failures.lock().await.push(failed);
        }

        let remaining = pending.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        let status = if remaining > 0 {
            SyncStatus::Syncing { pending: remaining }
        } else {
            let failures = failures.lock().await;
            match failures.last() {
                Some(last) => SyncStatus::Failed {
                    failed: failures.len(),
                    last_error: last.error.clone(),
                },
                None => SyncStatus::Idle,
            }
        };
        status_tx.send_replace(status);
    }
}

async fn deliver(
    api: &dyn ProgressApi,
    policy: &RetryPolicy,
    write: PendingWrite,
) -> Result<(), FailedWrite> {
    let mut attempt = 1;
    loop {
        match api.apply(&write).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_permanent() || attempt >= policy.max_attempts => {
                tracing::error!(?write, attempt, "Giving up on progress write: {}", err);
                return Err(FailedWrite {
                    write,
                    error: err.to_string(),
                    attempts: attempt,
                });
            }
            Err(err) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    ?write,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Progress write failed, retrying: {}",
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
