//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine internals (tracking, intercept, registry):
//!     → logging.rs (tracing subscriber: env filter + fmt/json layer)
//!     → metrics.rs (call counters, duration histogram, capture failures)
//!
//! Consumers:
//!     → stdout / log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or recorder is the
//!   embedding program's choice
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
