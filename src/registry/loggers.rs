//! Ordered collection of registered loggers.
//!
//! # Responsibilities
//! - Store registered loggers in registration order
//! - Resolve the matched-logger set for one outbound URL
//! - Clear all registrations
//!
//! # Design Decisions
//! - The list is an immutable `Arc<Vec<_>>` swapped atomically
//! - A matched set is a plain Vec of handles: in-flight calls keep their
//!   loggers alive after `clear()`, new calls never see them again

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::registry::logger::LoggerHandle;

/// Registry of logger configurations.
#[derive(Debug)]
pub struct LoggerRegistry {
    loggers: ArcSwap<Vec<LoggerHandle>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self {
            loggers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a logger.
    pub fn register(&self, logger: LoggerHandle) {
        self.loggers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(logger.clone());
            next
        });
    }

    /// Remove every registered logger.
    pub fn clear(&self) {
        self.loggers.store(Arc::new(Vec::new()));
    }

    /// All loggers whose URL filter accepts `url`, in registration order.
    pub fn matching(&self, url: &str) -> Vec<LoggerHandle> {
        self.loggers
            .load()
            .iter()
            .filter(|logger| logger.matches(url))
            .cloned()
            .collect()
    }

    /// Current registrations.
    pub fn snapshot(&self) -> Arc<Vec<LoggerHandle>> {
        self.loggers.load_full()
    }

    pub fn len(&self) -> usize {
        self.loggers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerOptions;
    use crate::registry::Logger;

    fn logger(options: LoggerOptions) -> LoggerHandle {
        Arc::new(Logger::new(options.resolve().unwrap()))
    }

    #[test]
    fn registers_in_order() {
        let registry = LoggerRegistry::new();
        registry.register(logger(LoggerOptions::new().name("first")));
        registry.register(logger(LoggerOptions::new().name("second")));

        let names: Vec<_> = registry
            .snapshot()
            .iter()
            .map(|l| l.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn matching_applies_url_filters() {
        let registry = LoggerRegistry::new();
        registry.register(logger(LoggerOptions::new().name("all")));
        registry.register(logger(
            LoggerOptions::new().name("api").url_pattern("/api/"),
        ));

        let matched = registry.matching("http://host/api/users");
        assert_eq!(matched.len(), 2);

        let matched = registry.matching("http://host/static/app.js");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name(), Some("all"));
    }

    #[test]
    fn clear_keeps_resolved_sets_alive() {
        let registry = LoggerRegistry::new();
        registry.register(logger(LoggerOptions::new().name("held")));

        let matched = registry.matching("http://host/");
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.matching("http://host/").is_empty());
        assert_eq!(matched[0].name(), Some("held"));
    }
}
