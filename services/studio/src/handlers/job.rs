use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use lumeo_core::identity::IdentityHeaders;
use lumeo_domain::id::JobId;
use lumeo_domain::pagination::PageRequest;

use crate::domain::types::Job;
use crate::error::StudioServiceError;
use crate::state::AppState;
use crate::usecase::status::{GetJobStatusUseCase, ListJobsUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct JobResponse {
    pub id: JobId,
    pub action: String,
    pub status: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub metadata: serde_json::Value,
    pub credits_cost: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(serialize_with = "lumeo_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(
        serialize_with = "lumeo_core::serde::to_rfc3339_ms_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(
        serialize_with = "lumeo_core::serde::to_rfc3339_ms_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            action: job.action.as_str().to_owned(),
            status: job.status.as_str().to_owned(),
            prompt: job.prompt,
            source_url: job.source_url,
            result_url: job.result_url,
            thumbnail_url: job.thumbnail_url,
            metadata: job.metadata,
            credits_cost: job.credits_cost,
            error: job.error,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /jobs/{id}`
pub async fn get_job(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Path(id): Path<JobId>,
) -> Result<Json<JobResponse>, StudioServiceError> {
    let uc = GetJobStatusUseCase {
        jobs: state.job_repo(),
        provider: state.provider.clone(),
        settle: state.settle(),
    };
    let job = uc.execute(identity.user_id, id).await?;
    Ok(Json(job.into()))
}

/// `GET /jobs`
pub async fn list_jobs(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<JobResponse>>, StudioServiceError> {
    let uc = ListJobsUseCase {
        jobs: state.job_repo(),
    };
    let jobs = uc.execute(identity.user_id, page).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}
