//! Event sinks.
//!
//! # Data Flow
//! ```text
//! Logger (per matched call)
//!     → StartEvent / EndEvent (owned, one per logger)
//!     → Formatter::on_request_start / on_request_end
//!         → tracing_formatter.rs (structured tracing events, default)
//!         → json.rs (one JSON document per event to a writer)
//! ```
//!
//! # Design Decisions
//! - Sinks receive owned events and never see the call context
//! - Sinks are called synchronously on the task that drives the call;
//!   slow sinks slow the call

pub mod json;
pub mod tracing_formatter;

pub use json::JsonFormatter;
pub use tracing_formatter::TracingFormatter;

use crate::events::{EndEvent, StartEvent};

/// Receives the events built for one logger.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Mutex;
/// use outbound_http_logger::{EndEvent, Formatter, StartEvent};
///
/// #[derive(Debug, Default)]
/// struct SlowCalls(Mutex<Vec<String>>);
///
/// impl Formatter for SlowCalls {
///     fn on_request_start(&self, _event: StartEvent) {}
///
///     fn on_request_end(&self, event: EndEvent) {
///         if event.timing.map_or(false, |t| t.total_ms > 500) {
///             self.0.lock().unwrap().push(event.url);
///         }
///     }
/// }
/// ```
pub trait Formatter: Send + Sync + std::fmt::Debug {
    /// Called once when the transport picks the call up.
    fn on_request_start(&self, event: StartEvent);

    /// Called once when the response body reaches end of stream.
    fn on_request_end(&self, event: EndEvent);
}
