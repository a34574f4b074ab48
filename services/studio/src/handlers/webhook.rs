use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::error::StudioServiceError;
use crate::state::AppState;
use crate::usecase::webhook::{HandleWebhookUseCase, WebhookPayload, verify_signature};

const SIGNATURE_HEADER: &str = "x-render-signature";

/// `POST /webhooks/render`
///
/// Raw body extractor: the signature covers the exact bytes on the wire, so
/// parsing happens only after verification.
pub async fn receive_render_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StudioServiceError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    verify_signature(state.config.webhook_secret.as_deref(), signature, &body)?;

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| StudioServiceError::InvalidRequest(format!("malformed payload: {e}")))?;

    let uc = HandleWebhookUseCase {
        jobs: state.job_repo(),
        settle: state.settle(),
    };
    uc.execute(payload).await?;
    Ok(StatusCode::OK)
}
