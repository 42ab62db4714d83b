//! Tracing subscriber setup

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "asll_user_import=info";

/// Install the fmt subscriber; later calls are no-ops.
pub fn init_tracing() {
    init_tracing_with(None);
}

/// Install the fmt subscriber with an explicit level for this crate.
///
/// `RUST_LOG` still wins when it is set.
pub fn init_tracing_with(level: Option<&str>) {
    let fallback = match level {
        Some(level) => format!("asll_user_import={level}"),
        None => DEFAULT_FILTER.to_string(),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
