//! Process-unique call identifiers for diagnostics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for call IDs. Only uniqueness matters.
static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of one tracked outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u64);

impl CallId {
    /// Generate a new unique call ID.
    pub fn new() -> Self {
        Self(CALL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call-{}", self.0)
    }
}
