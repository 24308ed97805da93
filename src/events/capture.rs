//! Body capture policy.
//!
//! # Responsibilities
//! - Decide whether a body may be inspected at all (known length, typed, not chunked)
//! - Decide whether a logger parses it as JSON (content-type + ceiling)
//! - Tell the engine whether any matched logger needs the bytes buffered
//!
//! # Design Decisions
//! - Request length is the exact size of the written body; response length is
//!   the declared `content-length`, never the observed byte count
//! - Buffering is bounded by the declared length, which the gate already holds
//!   under the logger's ceiling

use std::fmt;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use crate::registry::LoggerHandle;

/// Which side of the call a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDirection {
    Request,
    Response,
}

impl fmt::Display for BodyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyDirection::Request => f.write_str("request"),
            BodyDirection::Response => f.write_str("response"),
        }
    }
}

/// Failure while building an event from captured data.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("malformed JSON {direction} body: {source}")]
    MalformedJson {
        direction: BodyDirection,
        #[source]
        source: serde_json::Error,
    },
}

/// The facts about a body that the capture policy looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyGate {
    content_type: Option<String>,
    chunked: bool,
    length: Option<u64>,
}

impl BodyGate {
    pub fn new(content_type: Option<String>, chunked: bool, length: Option<u64>) -> Self {
        Self {
            content_type,
            chunked,
            length,
        }
    }

    /// Gate for an outgoing body whose exact size is `exact_size`, if known.
    pub fn for_request(headers: &HeaderMap, exact_size: Option<u64>) -> Self {
        Self::new(content_type(headers), is_chunked(headers), exact_size)
    }

    /// Gate for a response, sized by its `content-length` header.
    pub fn for_response(headers: &HeaderMap) -> Self {
        let length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        Self::new(content_type(headers), is_chunked(headers), length)
    }

    /// Length of the body when it may be inspected at all.
    pub fn inspectable_length(&self) -> Option<u64> {
        match self.length {
            Some(len) if len > 0 && self.content_type.is_some() && !self.chunked => Some(len),
            _ => None,
        }
    }

    /// True when the body is JSON and fits under `ceiling`.
    pub fn parses_json(&self, ceiling: usize) -> bool {
        let Some(len) = self.inspectable_length() else {
            return false;
        };
        let is_json = self
            .content_type
            .as_deref()
            .map(|t| t.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        is_json && len <= ceiling as u64
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers.get_all(TRANSFER_ENCODING).iter().any(|v| {
        v.to_str()
            .map(|s| s.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false)
    })
}

/// True if any matched logger will parse the request body.
pub fn wants_request_capture(loggers: &[LoggerHandle], gate: &BodyGate) -> bool {
    loggers.iter().any(|logger| {
        let options = logger.options();
        options.request_start
            && options.request_json_body
            && gate.parses_json(options.json_body_max_length)
    })
}

/// True if any matched logger will parse the response body.
pub fn wants_response_capture(loggers: &[LoggerHandle], gate: &BodyGate) -> bool {
    loggers.iter().any(|logger| {
        let options = logger.options();
        options.request_end
            && options.response_json_body
            && gate.parses_json(options.json_body_max_length)
    })
}

pub(crate) fn parse_json(bytes: &[u8], direction: BodyDirection) -> Result<Value, CaptureError> {
    serde_json::from_slice(bytes).map_err(|source| CaptureError::MalformedJson { direction, source })
}
