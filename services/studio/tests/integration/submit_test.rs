use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_studio::domain::types::{JobStatus, TxType};
use lumeo_studio::error::StudioServiceError;
use lumeo_studio::usecase::submit::SubmitJobUseCase;

use crate::helpers::{
    MockJobs, MockLedger, MockLimiter, MockProvider, PLAN, submit_request, test_job,
};

fn usecase(
    jobs: &MockJobs,
    ledger: &MockLedger,
    provider: &MockProvider,
    limiter: MockLimiter,
) -> SubmitJobUseCase<MockJobs, MockLedger, MockProvider, MockLimiter> {
    SubmitJobUseCase {
        jobs: jobs.clone(),
        ledger: ledger.clone(),
        provider: provider.clone(),
        limiter,
    }
}

#[tokio::test]
async fn should_submit_generation_and_charge_up_front() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let user = Uuid::now_v7();
    let job = test_job(user, GenAction::ImageGen);
    let request = submit_request(&job);

    let submitted = uc.execute(PLAN, job, request).await.unwrap();

    assert_eq!(submitted.status, JobStatus::Processing);
    assert!(submitted.task_handle.is_some());
    assert!(submitted.credits_charged);

    let stored = jobs.get(submitted.id).unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert!(stored.credits_charged);

    assert_eq!(ledger.image_remaining(), 5);
    let txs = ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, -5);
    assert_eq!(txs[0].tx_type, TxType::Usage);
    assert_eq!(txs[0].job_id, Some(submitted.id));
}

#[tokio::test]
async fn should_reject_submission_without_enough_credits() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(3);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    assert!(matches!(result, Err(StudioServiceError::InsufficientCredits)));
    assert_eq!(jobs.len(), 0, "pre-check failures must not leave job rows");
    assert_eq!(provider.submission_count(), 0);
}

#[tokio::test]
async fn should_fail_and_refund_when_provider_stays_busy() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::busy();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let id = job.id;
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    assert!(matches!(result, Err(StudioServiceError::ServiceBusy)));

    let stored = jobs.get(id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);

    // Submission-time charge came back.
    assert_eq!(ledger.image_remaining(), 10);
    let txs = ledger.transactions();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[1].tx_type, TxType::Refund);
    assert_eq!(txs[1].amount, 5);
}

#[tokio::test]
async fn should_fail_job_on_provider_rejection() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::rejecting();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let id = job.id;
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    match result {
        Err(StudioServiceError::SubmissionFailed(message)) => {
            assert_eq!(message, "unsupported prompt");
        }
        other => panic!("expected SubmissionFailed, got {other:?}"),
    }

    let stored = jobs.get(id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("unsupported prompt"));
    assert_eq!(ledger.image_remaining(), 10);
}

#[tokio::test]
async fn should_fail_job_when_usage_entry_cannot_be_written() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10).failing_transactions();
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let id = job.id;
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    assert!(matches!(result, Err(StudioServiceError::Internal(_))));

    // Never stranded in pending; the deduction came back.
    let stored = jobs.get(id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(ledger.image_remaining(), 10);
    assert_eq!(provider.submission_count(), 0);
}

#[tokio::test]
async fn should_fail_and_refund_when_charge_flag_cannot_be_stored() {
    let mut jobs = MockJobs::default();
    jobs.fail_set_charged = true;
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let id = job.id;
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    assert!(matches!(result, Err(StudioServiceError::Internal(_))));

    let stored = jobs.get(id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(ledger.image_remaining(), 10);
    let txs = ledger.transactions();
    assert_eq!(txs.last().unwrap().tx_type, TxType::Refund);
    assert_eq!(provider.submission_count(), 0);
}

#[tokio::test]
async fn should_rate_limit_before_touching_anything() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::closed());

    let job = test_job(Uuid::now_v7(), GenAction::ImageGen);
    let request = submit_request(&job);
    let result = uc.execute(PLAN, job, request).await;

    assert!(matches!(result, Err(StudioServiceError::RateLimited)));
    assert_eq!(jobs.len(), 0);
    assert_eq!(provider.submission_count(), 0);
    assert!(ledger.transactions().is_empty());
}

#[tokio::test]
async fn should_not_charge_edits_at_submission() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::Upscale);
    let request = submit_request(&job);
    let submitted = uc.execute(PLAN, job, request).await.unwrap();

    assert_eq!(submitted.status, JobStatus::Processing);
    assert!(!submitted.credits_charged);
    assert_eq!(ledger.image_remaining(), 10);
    assert!(ledger.transactions().is_empty());
}

#[tokio::test]
async fn should_charge_video_jobs_from_the_video_pool() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_video_credits(60);
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());

    let job = test_job(Uuid::now_v7(), GenAction::VideoGen);
    let request = submit_request(&job);
    uc.execute(PLAN, job, request).await.unwrap();

    let s = ledger.state.lock().unwrap();
    assert_eq!(s.video_used, 50);
    assert_eq!(s.image_used, 0);
}

#[tokio::test]
async fn should_admit_only_jobs_the_balance_covers_under_contention() {
    // 12 credits cover two 5-credit generations; five concurrent submissions
    // race for them.
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(12);
    let provider = MockProvider::succeeding();
    let user = Uuid::now_v7();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let uc = usecase(&jobs, &ledger, &provider, MockLimiter::open());
        handles.push(tokio::spawn(async move {
            let job = test_job(user, GenAction::ImageGen);
            let request = submit_request(&job);
            uc.execute(PLAN, job, request).await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 2);
    assert_eq!(ledger.image_remaining(), 2);
}
