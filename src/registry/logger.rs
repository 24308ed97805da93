//! Registered logger and per-logger event emission.

use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::events::{build_end_event, build_start_event, CaptureError, EndEvent, StartEvent};
use crate::tracking::RequestContext;

/// Shared reference to a registered logger.
pub type LoggerHandle = Arc<Logger>;

/// A registered logger: resolved options plus emission logic.
#[derive(Debug)]
pub struct Logger {
    options: LoggerConfig,
}

impl Logger {
    pub fn new(options: LoggerConfig) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoggerConfig {
        &self.options
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    /// Returns true if this logger observes calls to `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.options.matches(url)
    }

    /// Build this logger's start event from the call state.
    pub fn start_event(&self, context: &RequestContext) -> Result<Option<StartEvent>, CaptureError> {
        build_start_event(&self.options, context)
    }

    /// Build this logger's end event from the call state.
    pub fn end_event(&self, context: &RequestContext) -> Result<Option<EndEvent>, CaptureError> {
        build_end_event(&self.options, context)
    }

    pub fn emit_start(&self, event: StartEvent) {
        self.options.formatter.on_request_start(event);
    }

    pub fn emit_end(&self, event: EndEvent) {
        self.options.formatter.on_request_end(event);
    }
}
