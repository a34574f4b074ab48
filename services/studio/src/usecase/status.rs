//! Job status reads with on-read reconciliation.
//!
//! A status read on a `processing` job polls the provider once and reconciles
//! what it learns: terminal answers settle the job, progress answers update
//! metadata. Provider hiccups degrade to the cached row rather than failing
//! the read.

use uuid::Uuid;

use lumeo_domain::id::JobId;
use lumeo_domain::media::TaskState;
use lumeo_domain::pagination::PageRequest;

use crate::domain::repository::{
    BlobStoragePort, CreditLedgerRepository, GenerationProviderPort, JobRepository,
};
use crate::domain::repository::FileRepository;
use crate::domain::types::{Job, JobStatus};
use crate::error::StudioServiceError;
use crate::usecase::settle::SettleJobUseCase;

pub struct GetJobStatusUseCase<J, L, F, B, P>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
    P: GenerationProviderPort,
{
    pub jobs: J,
    pub provider: P,
    pub settle: SettleJobUseCase<J, L, F, B>,
}

impl<J, L, F, B, P> GetJobStatusUseCase<J, L, F, B, P>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
    P: GenerationProviderPort,
{
    pub async fn execute(&self, user_id: Uuid, id: JobId) -> Result<Job, StudioServiceError> {
        let job = self
            .jobs
            .find_by_id(id)
            .await?
            .filter(|j| j.user_id == user_id)
            .ok_or(StudioServiceError::JobNotFound)?;

        let handle = match (&job.status, &job.task_handle) {
            (JobStatus::Processing, Some(handle)) => handle.clone(),
            _ => return Ok(job),
        };

        let status = match self.provider.poll(&handle).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "status poll failed, serving cached state");
                return Ok(job);
            }
        };

        let outcome = match status.status {
            TaskState::Completed => match status.result.as_ref().and_then(|r| r.primary_url()) {
                Some(url) => {
                    let thumbnail = status.result.as_ref().and_then(|r| r.thumbnail_url());
                    self.settle.complete(&job, url, thumbnail).await
                }
                None => {
                    self.settle
                        .fail(&job, "provider reported completion without a result")
                        .await
                }
            },
            TaskState::Failed | TaskState::Cancelled => {
                let reason = status.error.as_deref().unwrap_or("generation failed");
                self.settle.fail(&job, reason).await
            }
            TaskState::Pending | TaskState::Processing => {
                let mut metadata = job.metadata.clone();
                if let (Some(progress), Some(map)) = (status.progress, metadata.as_object_mut()) {
                    map.insert("progress".into(), progress.into());
                }
                self.jobs.update_metadata(id, &metadata).await
            }
        };
        if let Err(e) = outcome {
            tracing::warn!(job_id = %id, error = %e, "reconciliation failed, serving cached state");
            return Ok(job);
        }

        // Serve whatever the reconciliation left behind.
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or(StudioServiceError::JobNotFound)
    }
}

pub struct ListJobsUseCase<J: JobRepository> {
    pub jobs: J,
}

impl<J: JobRepository> ListJobsUseCase<J> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, StudioServiceError> {
        self.jobs.list(user_id, page).await
    }
}
