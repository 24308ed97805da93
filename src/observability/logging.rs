//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the bootstrap binary
//! - Pick the human or JSON line format
//! - Resolve the log level from `RUST_LOG`, falling back to config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Installing twice is reported, not fatal (tests share one process)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Returns false if one was already installed.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let result = if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    match result {
        Ok(()) => {
            tracing::debug!(
                level = %config.log_level,
                json = config.json_logs,
                "Logging initialized"
            );
            true
        }
        Err(_) => false,
    }
}
