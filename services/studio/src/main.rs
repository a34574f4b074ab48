use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use lumeo_core::tracing::init_tracing;
use lumeo_studio::config::StudioConfig;
use lumeo_studio::infra::provider::HttpRenderClient;
use lumeo_studio::infra::rate_limit::MemoryRateLimiter;
use lumeo_studio::infra::storage::HttpBlobStorage;
use lumeo_studio::router::build_router;
use lumeo_studio::state::AppState;
use lumeo_studio::usecase::reaper::ReapStuckJobsUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Arc::new(StudioConfig::from_env());

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        provider: HttpRenderClient::new(
            config.provider_api_url.clone(),
            config.provider_api_key.clone(),
            config.webhook_url.clone(),
        ),
        storage: HttpBlobStorage::new(config.storage_url.clone()),
        limiter: Arc::new(MemoryRateLimiter::new()),
        config: Arc::clone(&config),
    };

    // Timeout reaper. Lost webhooks and dead tasks get failed (and refunded)
    // here instead of sitting in `processing` forever.
    let reaper = ReapStuckJobsUseCase {
        jobs: state.job_repo(),
        settle: state.settle(),
        timeout_secs: config.job_timeout_secs,
    };
    let reaper_interval = Duration::from_secs(config.reaper_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(reaper_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = reaper.execute().await {
                tracing::error!(error = %e, "reaper sweep failed");
            }
        }
    });

    // Periodic eviction of stale rate-limit windows.
    let limiter = Arc::clone(&state.limiter);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            limiter.sweep();
        }
    });

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.studio_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("studio service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
