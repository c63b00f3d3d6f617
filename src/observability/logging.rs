//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the crate logs at the configured
//! level and dependencies stay at `warn`. Output goes to stderr so progress
//! lines on stdout stay clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(level: &str) -> String {
    format!("warn,op_bridge={}", level)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
