/// Studio service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `STUDIO_PORT`.
    pub studio_port: u16,
    /// Base URL of the generation provider API (e.g. "https://api.render.example").
    pub provider_api_url: String,
    /// Bearer token for the provider API.
    pub provider_api_key: String,
    /// Publicly reachable URL of this service's webhook endpoint, sent along
    /// with every submission.
    pub webhook_url: String,
    /// HMAC secret for webhook signatures. Unset means unsigned deliveries
    /// are accepted.
    pub webhook_secret: Option<String>,
    /// Base URL of the blob storage gateway.
    pub storage_url: String,
    /// Seconds a job may stay `processing` before the reaper fails it
    /// (default 1800). Env var: `JOB_TIMEOUT_SECS`.
    pub job_timeout_secs: u64,
    /// Reaper sweep interval in seconds (default 60). Env var: `REAPER_INTERVAL_SECS`.
    pub reaper_interval_secs: u64,
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            studio_port: std::env::var("STUDIO_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            provider_api_url: std::env::var("PROVIDER_API_URL").expect("PROVIDER_API_URL"),
            provider_api_key: std::env::var("PROVIDER_API_KEY").expect("PROVIDER_API_KEY"),
            webhook_url: std::env::var("WEBHOOK_URL").expect("WEBHOOK_URL"),
            webhook_secret: std::env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            storage_url: std::env::var("STORAGE_URL").expect("STORAGE_URL"),
            job_timeout_secs: std::env::var("JOB_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            reaper_interval_secs: std::env::var("REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}
