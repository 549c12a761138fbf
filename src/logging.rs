//! Tracing subscriber setup. Logs go to stderr so they never mix with the
//! rendered report on stdout.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

/// Loads `.env` before reading `RUST_LOG`, so a filter kept there applies.
pub fn init() {
    dotenvy::dotenv().ok();

    let result = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();

    if result.is_ok() {
        tracing::debug!("logger initialized");
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
