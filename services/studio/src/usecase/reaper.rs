//! Timeout reaper for jobs stuck in `processing`.
//!
//! A crashed provider, a lost webhook, and a user who never polls all leave
//! jobs `processing` forever; the reaper sweeps them to `failed` (with
//! refund) once they exceed the configured timeout. It goes through the
//! same settlement arbiter as the webhook and the reconciler, so a result
//! landing mid-sweep still wins.

use chrono::{Duration, Utc};

use crate::domain::repository::{
    BlobStoragePort, CreditLedgerRepository, FileRepository, JobRepository,
};
use crate::error::StudioServiceError;
use crate::usecase::settle::SettleJobUseCase;

const REAP_BATCH: u64 = 100;

pub struct ReapStuckJobsUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    pub jobs: J,
    pub settle: SettleJobUseCase<J, L, F, B>,
    pub timeout_secs: u64,
}

impl<J, L, F, B> ReapStuckJobsUseCase<J, L, F, B>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    F: FileRepository,
    B: BlobStoragePort,
{
    /// One sweep. Returns how many jobs were failed.
    pub async fn execute(&self) -> Result<usize, StudioServiceError> {
        let cutoff = Utc::now() - Duration::seconds(self.timeout_secs as i64);
        let stuck = self.jobs.find_stuck(cutoff, REAP_BATCH).await?;
        let mut reaped = 0;
        for job in &stuck {
            if let Err(e) = self.settle.fail(job, "generation timed out").await {
                tracing::error!(job_id = %job.id, error = %e, "reaping failed");
                continue;
            }
            reaped += 1;
        }
        if reaped > 0 {
            tracing::info!(reaped, "timed out stuck jobs");
        }
        Ok(reaped)
    }
}
