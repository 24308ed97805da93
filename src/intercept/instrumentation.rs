//! Process-wide instrumentation state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use http::Request;
use http_body::Body;
use once_cell::sync::Lazy;

use crate::config::{ConfigError, InstrumentationConfig, LoggerOptions};
use crate::events::BodyGate;
use crate::intercept::layer::OutboundLoggerLayer;
use crate::registry::{Logger, LoggerHandle, LoggerRegistry};
use crate::stats::{StatsAggregator, StatsSnapshot};
use crate::tracking::{CallId, CallTarget, CallTracker, RequestContext};

static GLOBAL: Lazy<Instrumentation> = Lazy::new(Instrumentation::new);

#[derive(Debug)]
struct Shared {
    enabled: AtomicBool,
    registry: LoggerRegistry,
    stats: Arc<StatsAggregator>,
}

/// Handle to one instrumentation instance: the enabled flag, the registered
/// loggers and the call statistics. Clones share state.
///
/// Layers built from a handle observe `enable`/`disable` immediately, so a
/// client can be composed once at startup and toggled later.
#[derive(Debug, Clone)]
pub struct Instrumentation {
    shared: Arc<Shared>,
}

impl Instrumentation {
    /// A fresh, disabled instance with no loggers.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                enabled: AtomicBool::new(false),
                registry: LoggerRegistry::new(),
                stats: Arc::new(StatsAggregator::new()),
            }),
        }
    }

    /// The process-wide instance used by the crate-level functions.
    pub fn global() -> &'static Instrumentation {
        &GLOBAL
    }

    /// Start tracking calls through every layer built from this handle.
    /// Returns false if already enabled.
    pub fn enable(&self) -> bool {
        let changed = !self.shared.enabled.swap(true, Ordering::AcqRel);
        if changed {
            tracing::info!(loggers = self.shared.registry.len(), "Outbound instrumentation enabled");
        } else {
            tracing::debug!("Outbound instrumentation already enabled");
        }
        changed
    }

    /// Stop tracking new calls. Calls already in flight finish normally.
    /// Returns false if already disabled.
    pub fn disable(&self) -> bool {
        let changed = self.shared.enabled.swap(false, Ordering::AcqRel);
        if changed {
            tracing::info!("Outbound instrumentation disabled");
        } else {
            tracing::debug!("Outbound instrumentation already disabled");
        }
        changed
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Register a logger. Unset options inherit the defaults; invalid
    /// options are rejected here, never at call time.
    pub fn create(&self, options: LoggerOptions) -> Result<LoggerHandle, ConfigError> {
        let logger: LoggerHandle = Arc::new(Logger::new(options.resolve()?));
        self.shared.registry.register(logger.clone());
        tracing::debug!(
            name = logger.name().unwrap_or("<unnamed>"),
            filtered = logger.options().url_matcher.is_some(),
            "Logger registered"
        );
        Ok(logger)
    }

    /// Register every logger of a loaded config, then enable if it asks to.
    pub fn register_config(
        &self,
        config: &InstrumentationConfig,
    ) -> Result<Vec<LoggerHandle>, ConfigError> {
        let handles = config
            .loggers
            .iter()
            .map(|section| self.create(section.clone().into_options()))
            .collect::<Result<Vec<_>, _>>()?;
        if config.enabled {
            self.enable();
        }
        Ok(handles)
    }

    /// Remove all loggers and reset statistics. In-flight calls keep the
    /// loggers they matched.
    pub fn clear(&self) {
        self.shared.registry.clear();
        self.shared.stats.reset();
        tracing::debug!("Loggers and stats cleared");
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Log the current statistics snapshot.
    pub fn print_stats(&self) {
        let snapshot = self.stats();
        match serde_json::to_string(&snapshot) {
            Ok(json) => tracing::info!(count = snapshot.count, urls = %json, "Outbound call stats"),
            Err(e) => tracing::warn!(error = %e, "Failed to render stats"),
        }
    }

    pub fn loggers(&self) -> Vec<LoggerHandle> {
        self.shared.registry.snapshot().as_ref().clone()
    }

    /// A tower layer instrumenting any HTTP client service.
    pub fn layer(&self) -> OutboundLoggerLayer {
        OutboundLoggerLayer::new(self.clone())
    }

    /// Build the tracker for a call about to be sent.
    pub(crate) fn track<B: Body>(&self, request: &Request<B>) -> CallTracker {
        let target = CallTarget::from_request(request);
        let loggers = self.shared.registry.matching(&target.url);
        let gate = BodyGate::for_request(request.headers(), request.body().size_hint().exact());
        let context = RequestContext::new(
            CallId::new(),
            request.method().clone(),
            target,
            request.headers().clone(),
            gate,
        );
        tracing::trace!(
            call_id = %context.call_id(),
            method = %context.method(),
            url = %context.url(),
            matched = loggers.len(),
            "Call intercepted"
        );
        CallTracker::new(context, loggers, self.shared.stats.clone())
    }
}

impl Default for Instrumentation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn starts_disabled_and_toggles_idempotently() {
        let inst = Instrumentation::new();
        assert!(!inst.is_enabled());
        assert!(inst.enable());
        assert!(!inst.enable());
        assert!(inst.is_enabled());
        assert!(inst.disable());
        assert!(!inst.disable());
        assert!(!inst.is_enabled());
    }

    #[test]
    fn clones_share_state() {
        let inst = Instrumentation::new();
        let other = inst.clone();
        other.enable();
        other.create(LoggerOptions::new().name("a")).unwrap();
        assert!(inst.is_enabled());
        assert_eq!(inst.loggers().len(), 1);
    }

    #[test]
    fn instances_are_isolated() {
        let a = Instrumentation::new();
        let b = Instrumentation::new();
        a.create(LoggerOptions::new()).unwrap();
        assert_eq!(a.loggers().len(), 1);
        assert!(b.loggers().is_empty());
    }

    #[test]
    fn create_rejects_invalid_options() {
        let inst = Instrumentation::new();
        assert!(inst.create(LoggerOptions::new().url_pattern("[")).is_err());
        assert!(inst.loggers().is_empty());
    }

    #[test]
    fn clear_removes_loggers_and_stats() {
        let inst = Instrumentation::new();
        inst.create(LoggerOptions::new()).unwrap();
        inst.shared.stats.record("http://localhost:9000/");
        assert_eq!(inst.stats().count, 1);

        inst.clear();
        assert!(inst.loggers().is_empty());
        assert_eq!(inst.stats(), StatsSnapshot::default());
    }

    #[test]
    fn register_config_creates_loggers_and_enables() {
        let config = parse_config(
            r#"
            [[loggers]]
            name = "audit"

            [[loggers]]
            name = "api"
            url_pattern = "^https://api\\."
            "#,
        )
        .unwrap();
        let inst = Instrumentation::new();
        let handles = inst.register_config(&config).unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[1].name(), Some("api"));
        assert!(inst.is_enabled());
    }

    #[test]
    fn matched_set_is_fixed_at_track_time() {
        let inst = Instrumentation::new();
        inst.create(LoggerOptions::new().name("early")).unwrap();
        let req = Request::get("http://localhost:9000/")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .unwrap();
        let tracker = inst.track(&req);
        inst.create(LoggerOptions::new().name("late")).unwrap();
        inst.clear();

        assert_eq!(tracker.loggers().len(), 1);
        assert_eq!(tracker.loggers()[0].name(), Some("early"));
    }
}
