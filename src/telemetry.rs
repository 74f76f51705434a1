//! Tracing subscriber setup. `RUST_LOG` wins over the default filter.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "roster_backend=info,roster_server=info,tower_http=info";

/// Install the global subscriber: human-readable lines, or one JSON object per event when `json` is set.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}
