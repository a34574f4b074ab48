#![allow(async_fn_in_trait)]

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use lumeo_domain::action::CreditPool;
use lumeo_domain::id::{FileId, JobId, TaskHandle};
use lumeo_domain::media::TaskStatus;
use lumeo_domain::pagination::PageRequest;
use lumeo_domain::plan::Plan;

use crate::domain::types::{CreditAccount, CreditTransaction, FileRecord, Job, SubmitRequest};
use crate::error::{ProviderError, StudioServiceError};

/// Repository for generation jobs.
///
/// The two `*_if_active` methods are the race arbiter between the webhook
/// receiver, the poll reconciler, and the timeout reaper: they transition to
/// a terminal status only if the current status is still non-terminal, and
/// report through the returned bool whether this caller won.
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), StudioServiceError>;

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, StudioServiceError>;

    /// Webhook fallback lookup when the payload carries only the provider's
    /// task id.
    async fn find_by_task_handle(
        &self,
        handle: &TaskHandle,
    ) -> Result<Option<Job>, StudioServiceError>;

    async fn list(&self, user_id: Uuid, page: PageRequest)
    -> Result<Vec<Job>, StudioServiceError>;

    /// Record a successful submission: store the task handle, set status to
    /// `processing` and stamp `started_at`.
    async fn mark_processing(
        &self,
        id: JobId,
        handle: &TaskHandle,
    ) -> Result<(), StudioServiceError>;

    /// Replace progress metadata on a still-running job.
    async fn update_metadata(
        &self,
        id: JobId,
        metadata: &serde_json::Value,
    ) -> Result<(), StudioServiceError>;

    /// Transition to `completed` iff the job is still pending/processing.
    /// Returns `true` iff this call performed the transition.
    async fn complete_if_active(
        &self,
        id: JobId,
        result_url: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<bool, StudioServiceError>;

    /// Transition to `failed` iff the job is still pending/processing.
    /// Returns `true` iff this call performed the transition.
    async fn fail_if_active(&self, id: JobId, error: &str) -> Result<bool, StudioServiceError>;

    /// Mark the job's credits as deducted (at-most-once refund bookkeeping).
    async fn set_charged(&self, id: JobId) -> Result<(), StudioServiceError>;

    /// Jobs still `processing` whose `started_at` predates `cutoff` — input
    /// for the timeout reaper.
    async fn find_stuck(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Job>, StudioServiceError>;
}

/// The credit ledger: atomic conditional deductions, unconditional refunds,
/// and the append-only transaction log.
pub trait CreditLedgerRepository: Send + Sync {
    async fn find_account(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CreditAccount>, StudioServiceError>;

    /// Single conditional atomic update: increment the pool's `used` counter
    /// by `cost` only if `credits - used >= cost`. Returns whether the
    /// condition held. This is the true enforcement point; it is immune to
    /// races between concurrent requests on the same account.
    async fn try_deduct(
        &self,
        user_id: Uuid,
        pool: CreditPool,
        cost: i32,
    ) -> Result<bool, StudioServiceError>;

    /// Decrement the pool's `used` counter by `cost`, floored at zero.
    /// Unconditional — refunds are not blocked by balance checks.
    async fn refund(
        &self,
        user_id: Uuid,
        pool: CreditPool,
        cost: i32,
    ) -> Result<(), StudioServiceError>;

    /// Increment the legacy balance (purchased top-ups).
    async fn add_balance(&self, user_id: Uuid, amount: i32) -> Result<(), StudioServiceError>;

    async fn append_transaction(
        &self,
        tx: &CreditTransaction,
    ) -> Result<(), StudioServiceError>;

    async fn list_transactions(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<CreditTransaction>, StudioServiceError>;
}

/// Repository for durably stored artifacts.
pub trait FileRepository: Send + Sync {
    async fn create(&self, file: &FileRecord) -> Result<(), StudioServiceError>;

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FileRecord>, StudioServiceError>;

    /// Soft delete. Returns `true` if a row was flagged; ownership is part of
    /// the predicate.
    async fn soft_delete(&self, user_id: Uuid, id: FileId) -> Result<bool, StudioServiceError>;
}

/// Outbound port to the external generation provider.
pub trait GenerationProviderPort: Send + Sync {
    /// Submit a generation task. Retries provider-side throttling internally
    /// (bounded); surfaces exhaustion as [`ProviderError::Busy`].
    async fn submit(&self, request: &SubmitRequest) -> Result<TaskHandle, ProviderError>;

    /// Stateless status read. No retries — transient errors propagate and the
    /// caller's own reconciliation schedule retries.
    async fn poll(&self, handle: &TaskHandle) -> Result<TaskStatus, ProviderError>;
}

/// Outbound port to durable blob storage.
pub trait BlobStoragePort: Send + Sync {
    /// Fetch the provider's (time-limited) result URL into memory.
    async fn download(&self, url: &str) -> Result<Bytes, StudioServiceError>;

    /// Store bytes under `key`; returns the permanent public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StudioServiceError>;

    /// Remove the object under `key`. Used to drop a blob whose settlement
    /// lost the terminal-transition race.
    async fn delete(&self, key: &str) -> Result<(), StudioServiceError>;
}

/// Per-user sliding-window submission gate.
pub trait RateLimiterPort: Send + Sync {
    /// Count one request against the user's current window. Returns whether
    /// it is allowed under the plan's ceiling.
    async fn check(&self, user_id: Uuid, plan: Plan) -> Result<bool, StudioServiceError>;
}
