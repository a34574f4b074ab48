use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset. Query-level ORM noise stays out
/// of production logs by default.
const DEFAULT_DIRECTIVES: &str = "info,sea_orm=warn,sqlx=warn";

/// Initialize structured stdout tracing. Call once at service startup.
///
/// Safe to call multiple times — subsequent calls are silently ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .try_init();
}
