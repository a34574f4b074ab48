//! Job submission.
//!
//! Ordering matters here: the job row is created before any provider
//! contact, so every submission leaves an auditable record, and a job is
//! never left `pending` after this use case returns — it is `processing`
//! with a task handle, or `failed` with any charge refunded.

use lumeo_domain::action::{ChargePolicy, CreditPool};
use lumeo_domain::plan::Plan;

use crate::domain::repository::{
    CreditLedgerRepository, GenerationProviderPort, JobRepository, RateLimiterPort,
};
use crate::domain::types::{Job, JobStatus, SubmitRequest};
use crate::error::{ProviderError, StudioServiceError};
use crate::usecase::credits;

#[derive(Clone)]
pub struct SubmitJobUseCase<J, L, P, R>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    P: GenerationProviderPort,
    R: RateLimiterPort,
{
    pub jobs: J,
    pub ledger: L,
    pub provider: P,
    pub limiter: R,
}

impl<J, L, P, R> SubmitJobUseCase<J, L, P, R>
where
    J: JobRepository,
    L: CreditLedgerRepository,
    P: GenerationProviderPort,
    R: RateLimiterPort,
{
    pub async fn execute(
        &self,
        plan: Plan,
        mut job: Job,
        request: SubmitRequest,
    ) -> Result<Job, StudioServiceError> {
        if !self.limiter.check(job.user_id, plan).await? {
            return Err(StudioServiceError::RateLimited);
        }

        // Advisory pre-check before any row exists; the binding check is the
        // conditional deduction below.
        if job.credits_cost > 0 {
            let account = self
                .ledger
                .find_account(job.user_id)
                .await?
                .ok_or(StudioServiceError::AccountNotFound)?;
            let remaining = match job.action.pool() {
                CreditPool::Image => account.image_remaining(),
                CreditPool::Video => account.video_remaining(),
                CreditPool::Legacy => account.legacy_remaining(),
            };
            if remaining < job.credits_cost {
                return Err(StudioServiceError::InsufficientCredits);
            }
        }

        self.jobs.create(&job).await?;

        if job.action.charge_policy() == ChargePolicy::AtSubmission {
            match credits::charge(&self.ledger, job.user_id, job.action, job.id).await {
                Ok(()) => {
                    if let Err(e) = self.jobs.set_charged(job.id).await {
                        // The deduction stands but the row does not say so;
                        // no later settler would refund it.
                        self.abandon(&job, "submission could not be recorded", true).await;
                        return Err(e);
                    }
                    job.credits_charged = true;
                }
                Err(e @ StudioServiceError::InsufficientCredits) => {
                    // Lost a race with a concurrent submission since the
                    // pre-check. The job record stays, marked failed.
                    self.abandon(&job, "insufficient credits", false).await;
                    return Err(e);
                }
                Err(e) => {
                    // charge() has already compensated any deduction.
                    self.abandon(&job, "charge failed", false).await;
                    return Err(e);
                }
            }
        }

        match self.provider.submit(&request).await {
            Ok(handle) => {
                self.jobs.mark_processing(job.id, &handle).await?;
                job.status = JobStatus::Processing;
                job.task_handle = Some(handle);
                job.started_at = Some(chrono::Utc::now());
                Ok(job)
            }
            Err(provider_err) => {
                let message = match &provider_err {
                    ProviderError::Busy => "provider busy".to_owned(),
                    ProviderError::Rejected(m) => m.clone(),
                    ProviderError::Transport(e) => format!("submission failed: {e}"),
                };
                self.jobs.fail_if_active(job.id, &message).await?;
                if job.credits_charged {
                    credits::refund(&self.ledger, job.user_id, job.action, job.id).await?;
                }
                Err(match provider_err {
                    ProviderError::Busy => StudioServiceError::ServiceBusy,
                    ProviderError::Rejected(m) => StudioServiceError::SubmissionFailed(m),
                    ProviderError::Transport(e) => {
                        StudioServiceError::SubmissionFailed(format!("submission failed: {e}"))
                    }
                })
            }
        }
    }

    /// Terminal cleanup on a failed submission path. A `pending` row has no
    /// `started_at`, so the timeout reaper would never reach it; fail it
    /// here, best effort, and refund when a deduction survived.
    async fn abandon(&self, job: &Job, message: &str, refund: bool) {
        if let Err(e) = self.jobs.fail_if_active(job.id, message).await {
            tracing::error!(job_id = %job.id, error = %e, "could not fail abandoned job");
        }
        if refund {
            if let Err(e) = credits::refund(&self.ledger, job.user_id, job.action, job.id).await {
                tracing::error!(job_id = %job.id, error = %e, "could not refund abandoned job");
            }
        }
    }
}
