use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Studio service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum StudioServiceError {
    /// The user exceeded their plan's submission window.
    #[error("too many requests, slow down")]
    RateLimited,
    /// The provider kept returning 429 past the retry ceiling. Distinct from
    /// a hard failure so the UI can render "wait and retry".
    #[error("generation service is busy, try again shortly")]
    ServiceBusy,
    #[error("insufficient credits")]
    InsufficientCredits,
    /// The provider rejected the request outright (not a 429).
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    #[error("job not found")]
    JobNotFound,
    #[error("file not found")]
    FileNotFound,
    #[error("credit account not found")]
    AccountNotFound,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StudioServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited => "RATE_LIMITED",
            Self::ServiceBusy => "SERVICE_BUSY",
            Self::InsufficientCredits => "INSUFFICIENT_CREDITS",
            Self::SubmissionFailed(_) => "SUBMISSION_FAILED",
            Self::JobNotFound => "JOB_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for StudioServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceBusy => StatusCode::SERVICE_UNAVAILABLE,
            Self::InsufficientCredits => StatusCode::PAYMENT_REQUIRED,
            Self::SubmissionFailed(_) => StatusCode::BAD_GATEWAY,
            Self::JobNotFound | Self::FileNotFound | Self::AccountNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Errors from the generation provider port.
///
/// Kept separate from [`StudioServiceError`] so the submission usecase can
/// decide per variant how to surface it (busy vs hard failure).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// 429 after the retry ceiling; the final response, not an exception.
    #[error("provider rate limited after retries")]
    Busy,
    /// Non-retryable rejection, with the provider's own message.
    #[error("provider rejected request: {0}")]
    Rejected(String),
    /// Transport-level failure (connect, timeout, malformed body).
    #[error("provider transport error")]
    Transport(#[source] anyhow::Error),
}
