//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "TAGSHIFT_LOG";

/// Installs a global `fmt` subscriber. Returns `false` when one was already
/// installed, which leaves the existing subscriber in place.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = filter_for(config);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

fn filter_for(config: &LoggingConfig) -> EnvFilter {
    let from_env = std::env::var(LOG_ENV).ok();
    build_filter(from_env.as_deref(), &config.level)
}

/// The environment directive wins when it parses, then the configured
/// level, then `info`.
fn build_filter(from_env: Option<&str>, level: &str) -> EnvFilter {
    from_env
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
