//! Tracing subscriber setup for the binary.

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Set to `true` (or `1`) to emit JSON log lines.
pub const TRACING_LOG_JSON: &str = "TRACING_LOG_JSON";

const DEFAULT_FILTER: &str = "info";

macro_rules! install_fmt {
    (json @ $registry:ident, $filter:ident) => {{
        let fmt = tracing_subscriber::fmt::layer().json().with_filter($filter);
        $registry.with(fmt).init();
    }};
    (log @ $registry:ident, $filter:ident) => {{
        let fmt = tracing_subscriber::fmt::layer().with_filter($filter);
        $registry.with(fmt).init();
    }};
}

fn json_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. `TRACING_LOG_JSON`
/// switches the output to JSON.
///
/// ## Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing() {
    let registry = tracing_subscriber::registry();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json_enabled(std::env::var(TRACING_LOG_JSON).ok().as_deref()) {
        install_fmt!(json @ registry, filter);
    } else {
        install_fmt!(log @ registry, filter);
    }
}
