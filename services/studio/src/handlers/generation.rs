use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use lumeo_core::identity::IdentityHeaders;
use lumeo_domain::action::GenAction;

use crate::domain::types::{Job, SubmitRequest};
use crate::error::StudioServiceError;
use crate::handlers::job::JobResponse;
use crate::state::AppState;
use crate::usecase::submit::SubmitJobUseCase;

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub action: GenAction,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub reference_urls: Vec<String>,
}

const GENERATION_ACTIONS: [GenAction; 3] = [
    GenAction::ImageGen,
    GenAction::VideoGen,
    GenAction::ImageToVideo,
];

const EDIT_ACTIONS: [GenAction; 5] = [
    GenAction::RemoveBg,
    GenAction::Upscale,
    GenAction::GenFill,
    GenAction::Expand,
    GenAction::Edit,
];

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /generations`
pub async fn create_generation(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), StudioServiceError> {
    if !GENERATION_ACTIONS.contains(&request.action) {
        return Err(StudioServiceError::InvalidRequest(format!(
            "{} is not a generation action",
            request.action
        )));
    }
    if request.prompt.trim().is_empty() {
        return Err(StudioServiceError::InvalidRequest(
            "prompt must not be empty".into(),
        ));
    }
    if request.action == GenAction::ImageToVideo && request.source_url.is_none() {
        return Err(StudioServiceError::InvalidRequest(
            "image-to-video requires a source_url".into(),
        ));
    }
    submit(state, identity, request).await
}

/// `POST /edits`
pub async fn create_edit(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), StudioServiceError> {
    if !EDIT_ACTIONS.contains(&request.action) {
        return Err(StudioServiceError::InvalidRequest(format!(
            "{} is not an edit action",
            request.action
        )));
    }
    if request.source_url.is_none() {
        return Err(StudioServiceError::InvalidRequest(
            "edits require a source_url".into(),
        ));
    }
    submit(state, identity, request).await
}

async fn submit(
    state: AppState,
    identity: IdentityHeaders,
    request: CreateJobRequest,
) -> Result<(StatusCode, Json<JobResponse>), StudioServiceError> {
    let mut settings = serde_json::Map::new();
    if let Some(model) = &request.model {
        settings.insert("model".into(), model.clone().into());
    }
    if let Some(size) = &request.size {
        settings.insert("size".into(), size.clone().into());
    }
    if let Some(aspect_ratio) = &request.aspect_ratio {
        settings.insert("aspect_ratio".into(), aspect_ratio.clone().into());
    }
    if let Some(duration) = request.duration_secs {
        settings.insert("duration_secs".into(), duration.into());
    }

    let job = Job::new(
        identity.user_id,
        request.action,
        request.prompt.clone(),
        request.source_url.clone(),
        serde_json::Value::Object(settings),
    );

    // The source image leads the reference list for edit-style actions.
    let reference_urls: Vec<String> = request
        .source_url
        .iter()
        .cloned()
        .chain(request.reference_urls.iter().cloned())
        .collect();

    let submit_request = SubmitRequest {
        job_id: job.id,
        action: request.action,
        prompt: request.prompt,
        model: request.model,
        size: request.size,
        aspect_ratio: request.aspect_ratio,
        duration_secs: request.duration_secs,
        reference_urls,
    };

    let uc = SubmitJobUseCase {
        jobs: state.job_repo(),
        ledger: state.ledger_repo(),
        provider: state.provider.clone(),
        limiter: state.limiter.clone(),
    };
    let job = uc.execute(identity.plan, job, submit_request).await?;
    Ok((StatusCode::CREATED, Json(job.into())))
}
