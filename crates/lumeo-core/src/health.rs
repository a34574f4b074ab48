use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
}

/// Handler for `GET /healthz` — the process is up and serving.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness body for a service whose dependency check succeeded.
pub fn ready() -> (StatusCode, Json<HealthReport>) {
    (StatusCode::OK, Json(HealthReport { status: "ready" }))
}

/// Readiness body for a service that cannot reach a dependency.
pub fn degraded() -> (StatusCode, Json<HealthReport>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthReport { status: "degraded" }),
    )
}
