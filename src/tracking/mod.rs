//! Request context tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Intercepted request
//!     → target.rs (protocol, host, path, outbound URL)
//!     → context.rs (RequestContext, phase = Initiated)
//!     → tracker.rs (CallTracker: context + matched loggers)
//!
//! Lifecycle signals (from intercept::body / intercept::layer):
//!     socket assigned     → SocketAssigned   → start events
//!     response headers    → ResponseReceived
//!     data frames         → byte count (+ bounded capture)
//!     end of stream       → Ended            → stats + end events
//! ```
//!
//! # Design Decisions
//! - Phases only move forward; repeated or out-of-order signals are ignored
//! - Durations exist only once both defining timestamps exist
//! - The context is dropped with the last handle; nothing retains it after the end event

pub mod call_id;
pub mod context;
pub mod target;
pub mod tracker;

pub use call_id::CallId;
pub use context::{CallPhase, RequestContext};
pub use target::CallTarget;
pub use tracker::CallTracker;
