use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use lumeo_core::health::healthz;
use lumeo_core::middleware::request_id_layer;

use crate::handlers::{
    credits::{get_balance, list_transactions, topup},
    files::{delete_file, list_files},
    generation::{create_edit, create_generation},
    health::readyz,
    job::{get_job, list_jobs},
    webhook::receive_render_webhook,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Submission
        .route("/generations", post(create_generation))
        .route("/edits", post(create_edit))
        // Jobs
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(get_job))
        // Provider callback
        .route("/webhooks/render", post(receive_render_webhook))
        // Credits
        .route("/credits", get(get_balance))
        .route("/credits/transactions", get(list_transactions))
        .route("/credits/topup", post(topup))
        // Files
        .route("/files", get(list_files))
        .route("/files/{id}", delete(delete_file))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
