//! Logger registry subsystem.
//!
//! # Data Flow
//! ```text
//! create(options)
//!     → LoggerOptions::resolve() (defaults + validation)
//!     → Logger (immutable) wrapped in LoggerHandle
//!     → loggers.rs appends to the registered snapshot
//!
//! Interception time:
//!     outbound URL
//!     → loggers.rs loads one snapshot
//!     → matcher.rs evaluates each logger's URL filter
//!     → matched Vec<LoggerHandle> (fixed for the call's lifetime)
//! ```
//!
//! # Design Decisions
//! - Snapshot swap instead of a lock: readers never observe a half-cleared list
//! - Registration order is preserved and is the emission order
//! - Absent matcher = always matches (wildcard)

pub mod logger;
pub mod loggers;
pub mod matcher;

pub use logger::{Logger, LoggerHandle};
pub use loggers::LoggerRegistry;
pub use matcher::{HostMatcher, PrefixMatcher, RegexMatcher, UrlMatcher};
