//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body ceilings, addresses)
//! - Check that URL patterns compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InstrumentationConfig → Result<(), Vec<ValidationError>>
//! - Runs before any logger is registered

use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{InstrumentationConfig, MAX_JSON_BODY_CEILING};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logger {logger}: json_body_max_length {value} exceeds the {max} byte limit")]
    BodyCeilingTooLarge {
        logger: String,
        value: usize,
        max: usize,
    },

    #[error("logger {logger}: invalid url_pattern {pattern:?}: {reason}")]
    InvalidUrlPattern {
        logger: String,
        pattern: String,
        reason: String,
    },

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

pub(crate) fn validate_json_body_max_length(
    logger: &str,
    value: usize,
) -> Result<(), ValidationError> {
    if value > MAX_JSON_BODY_CEILING {
        return Err(ValidationError::BodyCeilingTooLarge {
            logger: logger.to_string(),
            value,
            max: MAX_JSON_BODY_CEILING,
        });
    }
    Ok(())
}

/// Validate a whole configuration file, collecting every error.
pub fn validate_config(config: &InstrumentationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (index, section) in config.loggers.iter().enumerate() {
        let label = section
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("#{}", index));

        if let Some(value) = section.json_body_max_length {
            if let Err(e) = validate_json_body_max_length(&label, value) {
                errors.push(e);
            }
        }

        if let Some(pattern) = &section.url_pattern {
            if let Err(e) = Regex::new(pattern) {
                errors.push(ValidationError::InvalidUrlPattern {
                    logger: label.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LoggerSection;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&InstrumentationConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = InstrumentationConfig::default();
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();
        config.loggers.push(LoggerSection {
            url_pattern: Some("[".into()),
            json_body_max_length: Some(MAX_JSON_BODY_CEILING * 2),
            ..Default::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".into())));
        assert!(errors.contains(&ValidationError::InvalidMetricsAddress("nowhere".into())));
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = InstrumentationConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unnamed_loggers_are_labelled_by_position() {
        let mut config = InstrumentationConfig::default();
        config.loggers.push(LoggerSection::default());
        config.loggers.push(LoggerSection {
            url_pattern: Some("(".into()),
            ..Default::default()
        });
        let errors = validate_config(&config).unwrap_err();
        match &errors[0] {
            ValidationError::InvalidUrlPattern { logger, .. } => assert_eq!(logger, "#1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
