//! Provider webhook handling.
//!
//! The webhook is an untrusted, at-least-once channel: payloads are
//! authenticated by HMAC before parsing, duplicates and stale deliveries
//! are absorbed by the settlement arbiter, and payloads for unknown jobs
//! are acknowledged and dropped so the provider stops redelivering them.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use lumeo_domain::id::{JobId, TaskHandle};
use lumeo_domain::media::{TaskResult, TaskState};

use crate::domain::repository::{
    BlobStoragePort, CreditLedgerRepository, FileRepository, JobRepository,
};
use crate::domain::types::Job;
use crate::error::StudioServiceError;
use crate::usecase::settle::SettleJobUseCase;

type HmacSha256 = Hmac<Sha256>;

/// Verify the webhook body against its signature header.
///
/// No configured secret means the check is disabled (local development).
/// With a secret, a missing or malformed header fails closed.
pub fn verify_signature(
    secret: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), StudioServiceError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let signature = signature.ok_or(StudioServiceError::InvalidSignature)?;
    let expected = hex::decode(signature).map_err(|_| StudioServiceError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| StudioServiceError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| StudioServiceError::InvalidSignature)
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Our job id, echoed back from the submission. Preferred lookup key.
    #[serde(default)]
    pub job_id: Option<JobId>,
    /// The provider's task id; fallback lookup key.
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskState,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub result: Option<TaskResult>,
    #[serde(default)]
    pub error: Option<String>,
}

pub struct HandleWebhookUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    pub jobs: J,
    pub settle: SettleJobUseCase<J, L, F, B>,
}

impl<J, L, F, B> HandleWebhookUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    pub async fn execute(&self, payload: WebhookPayload) -> Result<(), StudioServiceError> {
        let Some(job) = self.lookup(&payload).await? else {
            // Ack so the provider stops redelivering; nothing to correlate.
            tracing::warn!(
                job_id = ?payload.job_id,
                task_id = ?payload.task_id,
                "webhook for unknown job dropped"
            );
            return Ok(());
        };

        match payload.status {
            TaskState::Completed => match payload.result.as_ref().and_then(|r| r.primary_url()) {
                Some(url) => {
                    let thumbnail = payload.result.as_ref().and_then(|r| r.thumbnail_url());
                    self.settle.complete(&job, url, thumbnail).await
                }
                None => {
                    self.settle
                        .fail(&job, "provider reported completion without a result")
                        .await
                }
            },
            TaskState::Failed | TaskState::Cancelled => {
                let reason = payload.error.as_deref().unwrap_or("generation failed");
                self.settle.fail(&job, reason).await
            }
            TaskState::Pending | TaskState::Processing => {
                if job.status.is_terminal() {
                    // Stale delivery arriving after settlement.
                    return Ok(());
                }
                let mut metadata = job.metadata.clone();
                if let (Some(progress), Some(map)) = (payload.progress, metadata.as_object_mut()) {
                    map.insert("progress".into(), progress.into());
                }
                self.jobs.update_metadata(job.id, &metadata).await
            }
        }
    }

    async fn lookup(&self, payload: &WebhookPayload) -> Result<Option<Job>, StudioServiceError> {
        if let Some(id) = payload.job_id {
            if let Some(job) = self.jobs.find_by_id(id).await? {
                return Ok(Some(job));
            }
        }
        if let Some(task_id) = &payload.task_id {
            let handle = TaskHandle(task_id.clone());
            return self.jobs.find_by_task_handle(&handle).await;
        }
        Ok(None)
    }
}
