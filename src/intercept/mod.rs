//! Interception engine.
//!
//! # Data Flow
//! ```text
//! caller
//!     → OutboundLogger::call (layer.rs)
//!         disabled or TrackedCall present → straight through, untracked
//!         otherwise → mark TrackedCall, Instrumentation::track → CallTracker
//!     → InstrumentedBody (body.rs): first transport touch = socket assigned
//!     → inner client service (hyper-util, or any tower HTTP service)
//!     → response headers → CallTracker::response_received
//!     → TrackedBody (body.rs): data frames, end of stream → end events + stats
//! ```
//!
//! # Design Decisions
//! - Instrumentation is a composed layer, not a patched global entry point
//! - The enabled flag is read per call, so toggling affects new calls only
//! - Requests and responses pass through unchanged; request bodies are only
//!   buffered when a matched logger will parse them

pub mod body;
pub mod instrumentation;
pub mod layer;
pub mod marker;

pub use body::{BoxError, InstrumentedBody, TrackedBody};
pub use instrumentation::Instrumentation;
pub use layer::{OutboundLogger, OutboundLoggerLayer};
pub use marker::TrackedCall;
