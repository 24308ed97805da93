//! Outbound HTTP call logger.
//!
//! Instruments outbound HTTP client calls as a `tower` layer, producing
//! structured start/end events per registered logger and aggregate call
//! statistics without changing call sites.
//!
//! ```rust,ignore
//! use outbound_http_logger::{Instrumentation, LoggerOptions};
//! use tower::ServiceBuilder;
//!
//! let instrumentation = Instrumentation::global();
//! instrumentation.create(LoggerOptions::new().name("payments").url_pattern("^https://pay\\."))?;
//! instrumentation.enable();
//!
//! let client = ServiceBuilder::new()
//!     .layer(instrumentation.layer())
//!     .service(hyper_client);
//! ```

// Core subsystems
pub mod events;
pub mod intercept;
pub mod registry;
pub mod stats;
pub mod tracking;

// Cross-cutting concerns
pub mod config;
pub mod formatter;
pub mod observability;

pub use config::{ConfigError, InstrumentationConfig, LoggerConfig, LoggerOptions};
pub use events::{EndEvent, LogEvent, StartEvent};
pub use formatter::{Formatter, JsonFormatter, TracingFormatter};
pub use intercept::{
    Instrumentation, InstrumentedBody, OutboundLogger, OutboundLoggerLayer, TrackedBody,
    TrackedCall,
};
pub use registry::{LoggerHandle, UrlMatcher};
pub use stats::StatsSnapshot;

/// Register a logger with the process-wide instance.
pub fn create(options: LoggerOptions) -> Result<LoggerHandle, ConfigError> {
    Instrumentation::global().create(options)
}

/// Enable the process-wide instance. Returns false if already enabled.
pub fn enable() -> bool {
    Instrumentation::global().enable()
}

/// Disable the process-wide instance. Returns false if already disabled.
pub fn disable() -> bool {
    Instrumentation::global().disable()
}

/// Remove all loggers and reset statistics of the process-wide instance.
pub fn clear() {
    Instrumentation::global().clear()
}

/// Snapshot of the process-wide call counts.
pub fn stats() -> StatsSnapshot {
    Instrumentation::global().stats()
}

/// Log the process-wide call counts at info level.
pub fn print_stats() {
    Instrumentation::global().print_stats()
}
