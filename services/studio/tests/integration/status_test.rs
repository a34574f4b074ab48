use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_domain::media::{ImageAsset, TaskResult, TaskState, TaskStatus};
use lumeo_studio::domain::types::{JobStatus, TxType};
use lumeo_studio::error::StudioServiceError;
use lumeo_studio::usecase::status::GetJobStatusUseCase;

use crate::helpers::{
    MockFiles, MockJobs, MockLedger, MockProvider, MockStorage, processing_job, settle_usecase,
    test_job,
};

fn usecase(
    jobs: &MockJobs,
    ledger: &MockLedger,
    files: &MockFiles,
    storage: &MockStorage,
    provider: &MockProvider,
) -> GetJobStatusUseCase<MockJobs, MockLedger, MockFiles, MockStorage, MockProvider> {
    GetJobStatusUseCase {
        jobs: jobs.clone(),
        provider: provider.clone(),
        settle: settle_usecase(jobs, ledger, files, storage),
    }
}

fn completed_status(url: &str) -> TaskStatus {
    TaskStatus {
        status: TaskState::Completed,
        progress: Some(100),
        result: Some(TaskResult::Images(vec![ImageAsset {
            url: url.to_owned(),
            thumbnail_url: Some("https://provider/tmp/out_t.png".to_owned()),
        }])),
        error: None,
    }
}

#[tokio::test]
async fn should_reconcile_completed_poll_into_settled_job() {
    let user = Uuid::now_v7();
    let job = processing_job(user, GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let provider = MockProvider::polling(completed_status("https://provider/tmp/out.png"));
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let reconciled = uc.execute(user, job.id).await.unwrap();

    assert_eq!(reconciled.status, JobStatus::Completed);
    assert!(reconciled.result_url.is_some());
    assert_eq!(
        reconciled.thumbnail_url.as_deref(),
        Some("https://provider/tmp/out_t.png")
    );
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn should_update_progress_for_running_job() {
    let user = Uuid::now_v7();
    let job = processing_job(user, GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let provider = MockProvider::polling(TaskStatus {
        status: TaskState::Processing,
        progress: Some(42),
        result: None,
        error: None,
    });
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let refreshed = uc.execute(user, job.id).await.unwrap();

    assert_eq!(refreshed.status, JobStatus::Processing);
    assert_eq!(refreshed.metadata["progress"], 42);
}

#[tokio::test]
async fn should_serve_cached_state_when_poll_fails() {
    let user = Uuid::now_v7();
    let job = processing_job(user, GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    // No poll response configured: every poll is a transport error.
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let cached = uc.execute(user, job.id).await.unwrap();

    assert_eq!(cached.status, JobStatus::Processing);
    assert_eq!(cached.id, job.id);
}

#[tokio::test]
async fn should_fail_job_when_provider_reports_failure() {
    let user = Uuid::now_v7();
    let mut job = processing_job(user, GenAction::ImageGen);
    job.credits_charged = true;
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    ledger.state.lock().unwrap().image_used = 5;
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let provider = MockProvider::polling(TaskStatus {
        status: TaskState::Failed,
        progress: None,
        result: None,
        error: Some("content policy violation".to_owned()),
    });
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let failed = uc.execute(user, job.id).await.unwrap();

    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("content policy violation"));

    let txs = ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TxType::Refund);
    assert_eq!(ledger.image_remaining(), 10);
}

#[tokio::test]
async fn should_fail_completion_without_result_payload() {
    let user = Uuid::now_v7();
    let job = processing_job(user, GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let provider = MockProvider::polling(TaskStatus {
        status: TaskState::Completed,
        progress: Some(100),
        result: None,
        error: None,
    });
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let failed = uc.execute(user, job.id).await.unwrap();

    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(files.len(), 0);
}

#[tokio::test]
async fn should_hide_other_users_jobs() {
    let owner = Uuid::now_v7();
    let job = test_job(owner, GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let result = uc.execute(Uuid::now_v7(), job.id).await;

    assert!(matches!(result, Err(StudioServiceError::JobNotFound)));
}

#[tokio::test]
async fn should_not_poll_terminal_jobs() {
    let user = Uuid::now_v7();
    let mut job = processing_job(user, GenAction::ImageGen);
    job.status = JobStatus::Completed;
    job.result_url = Some("https://cdn.lumeo.app/done.png".to_owned());
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    // A poll would fail with a transport error; a terminal job must not care.
    let provider = MockProvider::succeeding();
    let uc = usecase(&jobs, &ledger, &files, &storage, &provider);

    let served = uc.execute(user, job.id).await.unwrap();

    assert_eq!(served.status, JobStatus::Completed);
    assert_eq!(served.result_url.as_deref(), Some("https://cdn.lumeo.app/done.png"));
}
