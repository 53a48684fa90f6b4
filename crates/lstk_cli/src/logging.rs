use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr subscriber. `filter` uses `EnvFilter` directive syntax; an invalid
/// value falls back to the default with a warning.
pub fn init(filter: Option<&str>) {
    let (env_filter, invalid) = match filter.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(error)) => (EnvFilter::new(DEFAULT_FILTER), Some(error)),
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        return;
    }
    if let Some(error) = invalid {
        tracing::warn!(%error, "ignoring invalid LSTK_LOG filter");
    }
}
