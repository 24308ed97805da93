//! Global call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::stats::normalize::normalize_url;

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Calls that reached stream end since the last reset.
    pub count: u64,
    /// Calls per normalized URL.
    pub urls: HashMap<String, u64>,
}

/// Total and per-URL call counters.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    count: AtomicU64,
    urls: DashMap<String, u64>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed call to `url`. Returns the normalized key.
    pub fn record(&self, url: &str) -> String {
        let key = normalize_url(url);
        *self.urls.entry(key.clone()).or_insert(0) += 1;
        self.count.fetch_add(1, Ordering::Relaxed);
        key
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            count: self.count(),
            urls: self
                .urls
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }

    pub fn reset(&self) {
        self.urls.clear();
        self.count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_total_and_per_url() {
        let stats = StatsAggregator::new();
        stats.record("http://localhost:9000");
        stats.record("http://localhost:9000/");
        stats.record("http://localhost:9000/foo");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.urls.len(), 2);
        assert_eq!(snapshot.urls["http://localhost:9000/"], 2);
        assert_eq!(snapshot.urls["http://localhost:9000/foo"], 1);
    }

    #[test]
    fn reset_clears_everything() {
        let stats = StatsAggregator::new();
        stats.record("http://a/");
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let stats = std::sync::Arc::new(StatsAggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record("http://host/path");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count, 800);
        assert_eq!(snapshot.urls["http://host/path"], 800);
    }
}
