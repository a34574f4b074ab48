//! HTTP client for the external generation provider.

use std::time::Duration;

use anyhow::anyhow;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use lumeo_domain::action::GenAction;
use lumeo_domain::id::TaskHandle;
use lumeo_domain::media::TaskStatus;

use crate::domain::repository::GenerationProviderPort;
use crate::domain::types::SubmitRequest;
use crate::error::ProviderError;

/// Fast image model. Cheap and quick, but cannot take reference images.
const SWIFT_IMAGE_MODEL: &str = "render-swift";
/// Standard image model; accepts reference images.
const STUDIO_IMAGE_MODEL: &str = "render-studio";

const MAX_SUBMIT_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(2);
/// Safety margin on top of the provider's own `retry_after` hint.
const RETRY_AFTER_BUFFER: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct HttpRenderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    webhook_url: String,
}

#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    image_urls: Vec<&'a str>,
    webhook_url: &'a str,
    /// Echoed back in webhook payloads for unambiguous correlation.
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    retry_after: Option<f64>,
}

/// Default model per action when the client did not pick one.
fn default_model(action: GenAction) -> &'static str {
    match action {
        GenAction::ImageGen => SWIFT_IMAGE_MODEL,
        GenAction::VideoGen | GenAction::ImageToVideo => "render-motion",
        GenAction::RemoveBg => "render-cutout",
        GenAction::Upscale => "render-upscale",
        GenAction::GenFill | GenAction::Expand | GenAction::Edit => "render-canvas",
        GenAction::Chat => "render-chat",
    }
}

/// Resolve the model for a request, transparently substituting a capable
/// model when the fast one cannot honor reference images. Surfacing the
/// provider's capability error to the user instead would read as a bug.
fn resolve_model(request: &SubmitRequest) -> String {
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| default_model(request.action).to_owned());
    if model == SWIFT_IMAGE_MODEL && !request.reference_urls.is_empty() {
        return STUDIO_IMAGE_MODEL.to_owned();
    }
    model
}

/// Delay before the next submit attempt: the provider's `retry_after` hint
/// plus a buffer when given, else linear backoff on the attempt number.
fn submit_backoff(attempt: u32, retry_after: Option<f64>) -> Duration {
    match retry_after {
        Some(secs) if secs >= 0.0 => Duration::from_secs_f64(secs) + RETRY_AFTER_BUFFER,
        _ => BACKOFF_BASE * attempt,
    }
}

impl HttpRenderClient {
    pub fn new(base_url: String, api_key: String, webhook_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            webhook_url,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/v1/tasks", self.base_url)
    }
}

impl GenerationProviderPort for HttpRenderClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<TaskHandle, ProviderError> {
        let model = resolve_model(request);
        let body = SubmitBody {
            model: &model,
            prompt: &request.prompt,
            size: request.size.as_deref(),
            aspect_ratio: request.aspect_ratio.as_deref(),
            duration_secs: request.duration_secs,
            image_urls: request.reference_urls.iter().map(String::as_str).collect(),
            webhook_url: &self.webhook_url,
            job_id: request.job_id.to_string(),
        };

        let mut attempt = 1;
        loop {
            let response = self
                .http
                .post(self.tasks_url())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| ProviderError::Transport(e.into()))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let hint = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|b| b.retry_after);
                if attempt >= MAX_SUBMIT_ATTEMPTS {
                    // The final 429 is returned, not thrown; the caller maps
                    // it to a user-facing "service busy" error.
                    return Err(ProviderError::Busy);
                }
                let delay = submit_backoff(attempt, hint);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "provider throttled, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| format!("provider returned {status}"));
                return Err(ProviderError::Rejected(message));
            }

            let parsed: SubmitResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::Transport(e.into()))?;
            return Ok(TaskHandle(parsed.task_id));
        }
    }

    async fn poll(&self, handle: &TaskHandle) -> Result<TaskStatus, ProviderError> {
        // Stateless read, no retries: the caller's reconciliation schedule
        // retries on its own clock.
        let response = self
            .http
            .get(format!("{}/{}", self.tasks_url(), handle.0))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(anyhow!(
                "poll returned {status} for task {handle}"
            )));
        }
        response
            .json::<TaskStatus>()
            .await
            .map_err(|e| ProviderError::Transport(e.into()))
    }
}
