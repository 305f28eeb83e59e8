use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the diagnostics filter.
pub const LOG_ENV: &str = "PLSYNC_LOG";

/// Installs the stderr diagnostics subscriber.
///
/// `filter` overrides `PLSYNC_LOG`; with neither set only warnings and errors
/// are shown. Calling this twice is harmless.
pub fn init(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
