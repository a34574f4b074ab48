use chrono::{Duration, Utc};
use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_studio::domain::types::{JobStatus, TxType};
use lumeo_studio::usecase::reaper::ReapStuckJobsUseCase;

use crate::helpers::{
    MockFiles, MockJobs, MockLedger, MockStorage, processing_job, settle_usecase,
};

const TIMEOUT_SECS: u64 = 1800;

fn usecase(
    jobs: &MockJobs,
    ledger: &MockLedger,
    files: &MockFiles,
    storage: &MockStorage,
) -> ReapStuckJobsUseCase<MockJobs, MockLedger, MockFiles, MockStorage> {
    ReapStuckJobsUseCase {
        jobs: jobs.clone(),
        settle: settle_usecase(jobs, ledger, files, storage),
        timeout_secs: TIMEOUT_SECS,
    }
}

#[tokio::test]
async fn should_fail_and_refund_stuck_jobs() {
    let mut stuck = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    stuck.credits_charged = true;
    stuck.started_at = Some(Utc::now() - Duration::hours(2));
    let jobs = MockJobs::with(vec![stuck.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    ledger.state.lock().unwrap().image_used = 5;
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    let reaped = uc.execute().await.unwrap();

    assert_eq!(reaped, 1);
    let stored = jobs.get(stuck.id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("generation timed out"));

    assert_eq!(ledger.image_remaining(), 10);
    let txs = ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TxType::Refund);
}

#[tokio::test]
async fn should_leave_recent_processing_jobs_alone() {
    let fresh = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![fresh.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    let reaped = uc.execute().await.unwrap();

    assert_eq!(reaped, 0);
    assert_eq!(jobs.get(fresh.id).unwrap().status, JobStatus::Processing);
}

#[tokio::test]
async fn should_sweep_each_stuck_job_independently() {
    let old = Utc::now() - Duration::hours(1);
    let mut a = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    a.started_at = Some(old);
    let mut b = processing_job(Uuid::now_v7(), GenAction::Upscale);
    b.started_at = Some(old);
    let fresh = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![a.clone(), b.clone(), fresh.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    let reaped = uc.execute().await.unwrap();

    assert_eq!(reaped, 2);
    assert_eq!(jobs.get(a.id).unwrap().status, JobStatus::Failed);
    assert_eq!(jobs.get(b.id).unwrap().status, JobStatus::Failed);
    assert_eq!(jobs.get(fresh.id).unwrap().status, JobStatus::Processing);
}
