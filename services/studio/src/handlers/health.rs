use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use lumeo_core::health::{self, HealthReport};

use crate::state::AppState;

/// Handler for `GET /readyz` — ready once the database answers.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    match state.db.ping().await {
        Ok(()) => health::ready(),
        Err(e) => {
            tracing::warn!(error = %e, "database unreachable");
            health::degraded()
        }
    }
}
