//! Configuration schema definitions.
//!
//! This module defines the per-logger options and the file-level configuration.
//! File types derive Serde traits for deserialization from TOML; the resolved
//! [`LoggerConfig`] carries live matcher and formatter objects and is built only
//! through [`LoggerOptions::resolve`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::validation::{validate_json_body_max_length, ValidationError};
use crate::formatter::{Formatter, JsonFormatter, TracingFormatter};
use crate::registry::matcher::{RegexMatcher, UrlMatcher};

/// Default ceiling for JSON body parsing (10 KiB).
pub const DEFAULT_JSON_BODY_MAX_LENGTH: usize = 10 * (1 << 10);

/// Hard upper bound accepted for `json_body_max_length` (16 MiB).
pub const MAX_JSON_BODY_CEILING: usize = 16 * (1 << 20);

/// Resolved, immutable configuration of one registered logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Optional label copied into every event.
    pub name: Option<String>,

    /// Attach durations to end events.
    pub timing: bool,

    /// Maximum declared body length eligible for JSON parsing.
    pub json_body_max_length: usize,

    /// URL filter. `None` matches every call.
    pub url_matcher: Option<Arc<dyn UrlMatcher>>,

    /// Emit start events.
    pub request_start: bool,

    /// Emit end events.
    pub request_end: bool,

    /// Include request headers in start events.
    pub request_headers: bool,

    /// Capture and parse JSON request bodies.
    pub request_json_body: bool,

    /// Include response headers in end events.
    pub response_headers: bool,

    /// Capture and parse JSON response bodies.
    pub response_json_body: bool,

    /// Sink receiving this logger's events.
    pub formatter: Arc<dyn Formatter>,
}

impl LoggerConfig {
    /// Returns true if this logger observes calls to `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.url_matcher
            .as_ref()
            .map(|m| m.matches(url))
            .unwrap_or(true)
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: None,
            timing: true,
            json_body_max_length: DEFAULT_JSON_BODY_MAX_LENGTH,
            url_matcher: None,
            request_start: true,
            request_end: true,
            request_headers: true,
            request_json_body: true,
            response_headers: true,
            response_json_body: false,
            formatter: Arc::new(TracingFormatter::default()),
        }
    }
}

/// Partial logger options. Unset fields inherit the [`LoggerConfig`] defaults.
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub name: Option<String>,
    pub timing: Option<bool>,
    pub json_body_max_length: Option<usize>,
    pub url_matcher: Option<Arc<dyn UrlMatcher>>,
    pub url_pattern: Option<String>,
    pub request_start: Option<bool>,
    pub request_end: Option<bool>,
    pub request_headers: Option<bool>,
    pub request_json_body: Option<bool>,
    pub response_headers: Option<bool>,
    pub response_json_body: Option<bool>,
    pub formatter: Option<Arc<dyn Formatter>>,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn timing(mut self, enabled: bool) -> Self {
        self.timing = Some(enabled);
        self
    }

    pub fn json_body_max_length(mut self, bytes: usize) -> Self {
        self.json_body_max_length = Some(bytes);
        self
    }

    /// Filter calls with a custom matcher. Replaces any pattern set earlier.
    pub fn url_matcher(mut self, matcher: impl UrlMatcher + 'static) -> Self {
        self.url_matcher = Some(Arc::new(matcher));
        self.url_pattern = None;
        self
    }

    /// Filter calls with a regular expression tested against the full URL.
    /// The pattern is compiled when the logger is registered.
    pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self.url_matcher = None;
        self
    }

    pub fn request_start(mut self, enabled: bool) -> Self {
        self.request_start = Some(enabled);
        self
    }

    pub fn request_end(mut self, enabled: bool) -> Self {
        self.request_end = Some(enabled);
        self
    }

    pub fn request_headers(mut self, enabled: bool) -> Self {
        self.request_headers = Some(enabled);
        self
    }

    pub fn request_json_body(mut self, enabled: bool) -> Self {
        self.request_json_body = Some(enabled);
        self
    }

    pub fn response_headers(mut self, enabled: bool) -> Self {
        self.response_headers = Some(enabled);
        self
    }

    pub fn response_json_body(mut self, enabled: bool) -> Self {
        self.response_json_body = Some(enabled);
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn shared_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Merge over defaults and validate.
    pub fn resolve(self) -> Result<LoggerConfig, ConfigError> {
        let defaults = LoggerConfig::default();
        let name = self.name.filter(|n| !n.is_empty());
        let label = name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        let json_body_max_length = self
            .json_body_max_length
            .unwrap_or(defaults.json_body_max_length);
        validate_json_body_max_length(&label, json_body_max_length)
            .map_err(ConfigError::InvalidOption)?;

        let url_matcher = match (self.url_matcher, self.url_pattern) {
            (Some(matcher), _) => Some(matcher),
            (None, Some(pattern)) => {
                let matcher = RegexMatcher::new(&pattern).map_err(|e| {
                    ConfigError::InvalidOption(ValidationError::InvalidUrlPattern {
                        logger: label.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
                })?;
                Some(Arc::new(matcher) as Arc<dyn UrlMatcher>)
            }
            (None, None) => None,
        };

        Ok(LoggerConfig {
            name,
            timing: self.timing.unwrap_or(defaults.timing),
            json_body_max_length,
            url_matcher,
            request_start: self.request_start.unwrap_or(defaults.request_start),
            request_end: self.request_end.unwrap_or(defaults.request_end),
            request_headers: self.request_headers.unwrap_or(defaults.request_headers),
            request_json_body: self.request_json_body.unwrap_or(defaults.request_json_body),
            response_headers: self.response_headers.unwrap_or(defaults.response_headers),
            response_json_body: self
                .response_json_body
                .unwrap_or(defaults.response_json_body),
            formatter: self.formatter.unwrap_or(defaults.formatter),
        })
    }
}

/// Root configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Enable instrumentation right after the loggers are registered.
    pub enabled: bool,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Logger definitions, registered in order.
    pub loggers: Vec<LoggerSection>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            observability: ObservabilityConfig::default(),
            loggers: Vec::new(),
        }
    }
}

/// One `[[loggers]]` table. Absent keys inherit the logger defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerSection {
    pub name: Option<String>,
    pub timing: Option<bool>,
    pub json_body_max_length: Option<usize>,

    /// Regular expression tested against the full outbound URL.
    pub url_pattern: Option<String>,

    pub request_start: Option<bool>,
    pub request_end: Option<bool>,
    pub request_headers: Option<bool>,
    pub request_json_body: Option<bool>,
    pub response_headers: Option<bool>,
    pub response_json_body: Option<bool>,
    pub formatter: FormatterKind,
}

impl LoggerSection {
    pub fn into_options(self) -> LoggerOptions {
        LoggerOptions {
            name: self.name,
            timing: self.timing,
            json_body_max_length: self.json_body_max_length,
            url_matcher: None,
            url_pattern: self.url_pattern,
            request_start: self.request_start,
            request_end: self.request_end,
            request_headers: self.request_headers,
            request_json_body: self.request_json_body,
            response_headers: self.response_headers,
            response_json_body: self.response_json_body,
            formatter: Some(self.formatter.build()),
        }
    }
}

/// Built-in sinks selectable from a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    #[default]
    Tracing,
    Json,
    JsonPretty,
}

impl FormatterKind {
    pub fn build(self) -> Arc<dyn Formatter> {
        match self {
            FormatterKind::Tracing => Arc::new(TracingFormatter::default()),
            FormatterKind::Json => Arc::new(JsonFormatter::stdout()),
            FormatterKind::JsonPretty => Arc::new(JsonFormatter::stdout().pretty()),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_resolve_to_defaults() {
        let config = LoggerOptions::new().resolve().unwrap();
        assert_eq!(config.name, None);
        assert!(config.timing);
        assert_eq!(config.json_body_max_length, 10240);
        assert!(config.url_matcher.is_none());
        assert!(config.request_start);
        assert!(config.request_end);
        assert!(config.request_headers);
        assert!(config.request_json_body);
        assert!(config.response_headers);
        assert!(!config.response_json_body);
    }

    #[test]
    fn set_fields_override_defaults() {
        let config = LoggerOptions::new()
            .name("billing")
            .timing(false)
            .json_body_max_length(512)
            .response_json_body(true)
            .request_headers(false)
            .resolve()
            .unwrap();
        assert_eq!(config.name.as_deref(), Some("billing"));
        assert!(!config.timing);
        assert_eq!(config.json_body_max_length, 512);
        assert!(config.response_json_body);
        assert!(!config.request_headers);
        assert!(config.request_start);
    }

    #[test]
    fn empty_name_is_treated_as_unset() {
        let config = LoggerOptions::new().name("").resolve().unwrap();
        assert_eq!(config.name, None);
    }

    #[test]
    fn invalid_pattern_fails_at_resolve() {
        let err = LoggerOptions::new().url_pattern("(unclosed").resolve().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOption(ValidationError::InvalidUrlPattern { .. })
        ));
    }

    #[test]
    fn oversized_ceiling_fails_at_resolve() {
        let err = LoggerOptions::new()
            .json_body_max_length(MAX_JSON_BODY_CEILING + 1)
            .resolve()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOption(ValidationError::BodyCeilingTooLarge { .. })
        ));
    }

    #[test]
    fn pattern_matcher_filters_urls() {
        let config = LoggerOptions::new()
            .url_pattern(r"^https://api\.example\.com/")
            .resolve()
            .unwrap();
        assert!(config.matches("https://api.example.com/v1/users"));
        assert!(!config.matches("http://localhost:9000/"));
    }

    #[test]
    fn section_deserializes_with_defaults() {
        let section: LoggerSection = toml::from_str(
            r#"
            name = "audit"
            response_json_body = true
            formatter = "json_pretty"
            "#,
        )
        .unwrap();
        assert_eq!(section.formatter, FormatterKind::JsonPretty);
        let config = section.into_options().resolve().unwrap();
        assert_eq!(config.name.as_deref(), Some("audit"));
        assert!(config.response_json_body);
        assert!(config.timing);
    }
}
