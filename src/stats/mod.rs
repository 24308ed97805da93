//! Call statistics subsystem.
//!
//! # Data Flow
//! ```text
//! Tracked call reaches stream end
//!     → normalize.rs (canonical URL key)
//!     → aggregator.rs (total + per-URL counters)
//!     → observability::metrics (exported counters)
//!
//! stats()  → StatsSnapshot (owned copy)
//! clear()  → counters reset
//! ```
//!
//! # Design Decisions
//! - Counting happens once per call, at stream end, whether or not a logger matched
//! - Counters are atomics and a sharded map; no global lock on the hot path

pub mod aggregator;
pub mod normalize;

pub use aggregator::{StatsAggregator, StatsSnapshot};
pub use normalize::normalize_url;
