use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_domain::media::{ImageAsset, TaskResult, TaskState};
use lumeo_studio::domain::types::JobStatus;
use lumeo_studio::usecase::webhook::{HandleWebhookUseCase, WebhookPayload};

use crate::helpers::{
    MockFiles, MockJobs, MockLedger, MockStorage, processing_job, settle_usecase,
};

fn usecase(
    jobs: &MockJobs,
    ledger: &MockLedger,
    files: &MockFiles,
    storage: &MockStorage,
) -> HandleWebhookUseCase<MockJobs, MockLedger, MockFiles, MockStorage> {
    HandleWebhookUseCase {
        jobs: jobs.clone(),
        settle: settle_usecase(jobs, ledger, files, storage),
    }
}

fn completed_payload(job_id: Option<lumeo_domain::id::JobId>, task_id: Option<&str>) -> WebhookPayload {
    WebhookPayload {
        job_id,
        task_id: task_id.map(str::to_owned),
        status: TaskState::Completed,
        progress: Some(100),
        result: Some(TaskResult::Images(vec![ImageAsset {
            url: "https://provider/tmp/out.png".to_owned(),
            thumbnail_url: None,
        }])),
        error: None,
    }
}

#[tokio::test]
async fn should_settle_job_from_completed_webhook() {
    let job = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(completed_payload(Some(job.id), None)).await.unwrap();

    assert_eq!(jobs.get(job.id).unwrap().status, JobStatus::Completed);
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn should_look_up_by_task_id_when_job_id_is_absent() {
    let job = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(completed_payload(None, Some("task-1"))).await.unwrap();

    assert_eq!(jobs.get(job.id).unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn should_ack_and_drop_webhook_for_unknown_job() {
    let jobs = MockJobs::default();
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    // Must not error: the provider would keep redelivering otherwise.
    uc.execute(completed_payload(None, Some("task-unknown")))
        .await
        .unwrap();

    assert_eq!(files.len(), 0);
}

#[tokio::test]
async fn should_absorb_duplicate_terminal_deliveries() {
    let job = processing_job(Uuid::now_v7(), GenAction::Upscale);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(completed_payload(Some(job.id), None)).await.unwrap();
    uc.execute(completed_payload(Some(job.id), None)).await.unwrap();

    assert_eq!(files.len(), 1);
    // Completion-time charge happened exactly once.
    assert_eq!(ledger.image_remaining(), 8);
    assert_eq!(ledger.transactions().len(), 1);
}

#[tokio::test]
async fn should_record_failure_from_webhook() {
    let mut job = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    job.credits_charged = true;
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    ledger.state.lock().unwrap().image_used = 5;
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(WebhookPayload {
        job_id: Some(job.id),
        task_id: None,
        status: TaskState::Failed,
        progress: None,
        result: None,
        error: Some("gpu worker died".to_owned()),
    })
    .await
    .unwrap();

    let stored = jobs.get(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("gpu worker died"));
    assert_eq!(ledger.image_remaining(), 10);
}

#[tokio::test]
async fn should_apply_progress_from_non_terminal_webhook() {
    let job = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(WebhookPayload {
        job_id: Some(job.id),
        task_id: None,
        status: TaskState::Processing,
        progress: Some(63),
        result: None,
        error: None,
    })
    .await
    .unwrap();

    let stored = jobs.get(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert_eq!(stored.metadata["progress"], 63);
}

#[tokio::test]
async fn should_ignore_stale_progress_after_settlement() {
    let job = processing_job(Uuid::now_v7(), GenAction::ImageGen);
    let jobs = MockJobs::with(vec![job.clone()]);
    let ledger = MockLedger::with_image_credits(10);
    let files = MockFiles::default();
    let storage = MockStorage::default();
    let uc = usecase(&jobs, &ledger, &files, &storage);

    uc.execute(completed_payload(Some(job.id), None)).await.unwrap();
    uc.execute(WebhookPayload {
        job_id: Some(job.id),
        task_id: None,
        status: TaskState::Processing,
        progress: Some(80),
        result: None,
        error: None,
    })
    .await
    .unwrap();

    let stored = jobs.get(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert!(stored.metadata.get("progress").is_none());
}
