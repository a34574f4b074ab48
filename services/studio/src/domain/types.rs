use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_domain::id::{FileId, JobId, TaskHandle};
use lumeo_domain::media::MediaKind;

/// Lifecycle state of a generation job.
///
/// `pending → processing → {completed | failed}`. The terminal states are
/// written only through conditional transitions; see `JobRepository`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct UnknownJobStatus(String);

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownJobStatus(other.to_owned())),
        }
    }
}

/// One generation request tracked through submission to completion.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub user_id: Uuid,
    pub action: GenAction,
    pub status: JobStatus,
    pub prompt: String,
    pub source_url: Option<String>,
    pub settings: serde_json::Value,
    pub task_handle: Option<TaskHandle>,
    pub result_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub metadata: serde_json::Value,
    pub credits_cost: i32,
    pub credits_charged: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Fresh `pending` job; no provider contact has happened yet.
    pub fn new(
        user_id: Uuid,
        action: GenAction,
        prompt: String,
        source_url: Option<String>,
        settings: serde_json::Value,
    ) -> Self {
        Self {
            id: JobId::new(),
            user_id,
            action,
            status: JobStatus::Pending,
            prompt,
            source_url,
            settings,
            task_handle: None,
            result_url: None,
            thumbnail_url: None,
            metadata: serde_json::Value::Object(Default::default()),
            credits_cost: action.cost(),
            credits_charged: false,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from(self.action)
    }
}

/// Ledger state for one user: two metered pools plus the legacy balance.
#[derive(Debug, Clone)]
pub struct CreditAccount {
    pub user_id: Uuid,
    pub image_credits: i32,
    pub image_credits_used: i32,
    pub video_credits: i32,
    pub video_credits_used: i32,
    pub credits_balance: i32,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    pub fn image_remaining(&self) -> i32 {
        self.image_credits - self.image_credits_used
    }

    pub fn video_remaining(&self) -> i32 {
        self.video_credits - self.video_credits_used
    }

    pub fn legacy_remaining(&self) -> i32 {
        self.credits_balance - self.credits_used
    }
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Usage,
    Refund,
    Purchase,
}

impl TxType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Refund => "refund",
            Self::Purchase => "purchase",
        }
    }
}

/// Append-only ledger entry. Negative `amount` for usage, positive for
/// refunds and purchases.
#[derive(Debug, Clone)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    pub tx_type: TxType,
    /// The action that caused the entry; absent for purchases.
    pub action: Option<GenAction>,
    pub job_id: Option<JobId>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    pub fn new(
        user_id: Uuid,
        amount: i32,
        tx_type: TxType,
        action: Option<GenAction>,
        job_id: Option<JobId>,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            amount,
            tx_type,
            action,
            job_id,
            description,
            created_at: Utc::now(),
        }
    }
}

/// How a stored artifact came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    Upload,
    Generated,
    Edited,
}

impl FileOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Generated => "generated",
            Self::Edited => "edited",
        }
    }
}

/// A durably stored artifact.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    pub user_id: Uuid,
    pub job_id: Option<JobId>,
    pub origin: FileOrigin,
    pub kind: MediaKind,
    pub storage_key: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters handed to the provider on submission.
///
/// `model: None` lets the client pick the action's default model. The client
/// also applies capability substitution when reference images are present.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub job_id: JobId,
    pub action: GenAction,
    pub prompt: String,
    pub model: Option<String>,
    pub size: Option<String>,
    pub aspect_ratio: Option<String>,
    pub duration_secs: Option<u32>,
    pub reference_urls: Vec<String>,
}
