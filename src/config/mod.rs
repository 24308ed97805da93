//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InstrumentationConfig (validated, immutable)
//!     → LoggerSection[] → LoggerOptions → LoggerConfig (registered)
//!
//! Programmatic registration:
//!     LoggerOptions (partial, builder)
//!     → resolve() merges over defaults, compiles URL pattern
//!     → LoggerConfig (immutable once registered)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Invalid options fail at registration, never later at call time

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FormatterKind, InstrumentationConfig, LoggerConfig, LoggerOptions, LoggerSection,
    ObservabilityConfig, DEFAULT_JSON_BODY_MAX_LENGTH, MAX_JSON_BODY_CEILING,
};
pub use validation::{validate_config, ValidationError};
