//! Client side of progress persistence.
//!
//! [`ApiClient`] talks to the backend's progress endpoints. [`ProgressSync`]
//! queues writes produced by optimistic local updates and delivers them in
//! the background with retries.

pub mod api;
pub mod sync;

pub use api::{ApiClient, ClientError, ProgressApi, RemoteFlashcard, RemoteProgress, SetProgress};
pub use sync::{FailedWrite, PendingWrite, ProgressSync, RetryPolicy, SyncConfig, SyncStatus};
