//! Terminal settlement of generation jobs.
//!
//! Completion and failure both arrive from three independent sources — the
//! provider webhook, the on-read poll reconciler, and the timeout reaper —
//! often for the same job at nearly the same time. The conditional terminal
//! transition in the repository picks exactly one winner, and only the
//! winner performs the side effects: file record, completion-time charge,
//! or refund.

use lumeo_domain::action::{ChargePolicy, GenAction};
use lumeo_domain::id::FileId;

use crate::domain::repository::{BlobStoragePort, CreditLedgerRepository, FileRepository, JobRepository};
use crate::domain::types::{FileOrigin, FileRecord, Job};
use crate::error::StudioServiceError;
use crate::usecase::credits;
use crate::usecase::materialize::MaterializeArtifactUseCase;

fn origin_for(action: GenAction) -> FileOrigin {
    match action {
        GenAction::ImageGen | GenAction::VideoGen | GenAction::ImageToVideo => {
            FileOrigin::Generated
        }
        _ => FileOrigin::Edited,
    }
}

#[derive(Clone)]
pub struct SettleJobUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    pub jobs: J,
    pub ledger: L,
    pub files: F,
    pub materializer: MaterializeArtifactUseCase<B>,
}

impl<J, L, F, B> SettleJobUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    /// Settle a successful result. Idempotent: a job that is already
    /// terminal, or a race lost to another settler, is a silent no-op.
    pub async fn complete(
        &self,
        job: &Job,
        result_url: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<(), StudioServiceError> {
        if job.status.is_terminal() {
            return Ok(());
        }

        // Materialize before the transition so a storage failure leaves the
        // job active and retryable by the next settler.
        let artifact = self.materializer.execute(job, result_url).await?;

        let won = self
            .jobs
            .complete_if_active(job.id, &artifact.url, thumbnail_url)
            .await?;
        if !won {
            tracing::debug!(job_id = %job.id, "job already settled elsewhere");
            // The winner's blob is the one on record; ours is an orphan.
            if let Err(e) = self.materializer.discard(&artifact.storage_key).await {
                tracing::warn!(
                    job_id = %job.id,
                    storage_key = %artifact.storage_key,
                    error = %e,
                    "could not discard losing artifact"
                );
            }
            return Ok(());
        }

        let file = FileRecord {
            id: FileId::new(),
            user_id: job.user_id,
            job_id: Some(job.id),
            origin: origin_for(job.action),
            kind: job.media_kind(),
            storage_key: artifact.storage_key,
            url: artifact.url,
            size: artifact.size,
            mime_type: job.media_kind().mime_type().to_owned(),
            deleted: false,
            created_at: chrono::Utc::now(),
        };
        self.files.create(&file).await?;

        if job.action.charge_policy() == ChargePolicy::OnCompletion && !job.credits_charged {
            match credits::charge(&self.ledger, job.user_id, job.action, job.id).await {
                Ok(()) => self.jobs.set_charged(job.id).await?,
                Err(StudioServiceError::InsufficientCredits) => {
                    // The result already exists; refusing it now helps nobody.
                    tracing::warn!(
                        job_id = %job.id,
                        user_id = %job.user_id,
                        "completed job could not be charged"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Settle a failure. The winner refunds submission-time charges;
    /// refund errors are logged, not propagated, so the terminal status
    /// sticks regardless.
    pub async fn fail(&self, job: &Job, error: &str) -> Result<(), StudioServiceError> {
        if job.status.is_terminal() {
            return Ok(());
        }

        let won = self.jobs.fail_if_active(job.id, error).await?;
        if !won {
            tracing::debug!(job_id = %job.id, "job already settled elsewhere");
            return Ok(());
        }

        tracing::info!(job_id = %job.id, error, "job failed");

        if job.credits_charged {
            if let Err(e) = credits::refund(&self.ledger, job.user_id, job.action, job.id).await {
                tracing::error!(
                    job_id = %job.id,
                    error = %e,
                    "refund for failed job did not go through"
                );
            }
        }

        Ok(())
    }
}
