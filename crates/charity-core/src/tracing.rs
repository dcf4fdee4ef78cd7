use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured stdout tracing. Call once at service startup.
///
/// JSON output in production; human-readable output when `debug` is set.
/// Later calls are no-ops.
pub fn init_tracing(debug: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if debug {
        registry.with(fmt::layer().pretty()).try_init()
    } else {
        registry.with(fmt::layer().json()).try_init()
    };
}
