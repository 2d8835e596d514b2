//! Structured logging setup shared by both binaries.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "fuel_risk=info";

/// Initialise the `tracing` subscriber.
///
/// `RUST_LOG` overrides the filter; setting `FUEL_RISK_LOG_JSON` switches
/// to JSON lines.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_logging = std::env::var("FUEL_RISK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
