//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level so a deployment can be made
//! more verbose without editing the config file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `level` applies to this crate and to tower-http; other crates log at
/// `warn`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn default_filter(level: &str) -> String {
    format!("warn,snap_routing={level},snap_serve={level},tower_http={level}")
}
