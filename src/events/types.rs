//! Start and end event shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Header map rendered for sinks: lowercase name to value, repeated headers
/// joined with `, `.
pub type HeaderFields = BTreeMap<String, String>;

/// Emitted when the transport picks a call up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<RequestContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContent {
    pub content_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Emitted when the response body reaches end of stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Start of the call, not of the response.
    pub timestamp: DateTime<Utc>,
    pub res_status: u16,
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    pub content: ResponseContent,
}

/// Call durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timing {
    /// Socket assignment to response headers.
    pub req_ms: u64,
    /// Call start to end of stream.
    pub total_ms: u64,
    /// Call start to socket assignment.
    pub socket_assignment_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseContent {
    /// Bytes actually received.
    pub read_content_size: u64,
    /// Length of the captured body, when one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Either event, tagged with `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    RequestStart(StartEvent),
    RequestEnd(EndEvent),
}

impl LogEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LogEvent::RequestStart(_) => "request_start",
            LogEvent::RequestEnd(_) => "request_end",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            LogEvent::RequestStart(e) => &e.url,
            LogEvent::RequestEnd(e) => &e.url,
        }
    }
}

impl From<StartEvent> for LogEvent {
    fn from(event: StartEvent) -> Self {
        LogEvent::RequestStart(event)
    }
}

impl From<EndEvent> for LogEvent {
    fn from(event: EndEvent) -> Self {
        LogEvent::RequestEnd(event)
    }
}

pub fn header_fields(headers: &HeaderMap) -> HeaderFields {
    let mut fields = HeaderFields::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match fields.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                fields.insert(name.as_str().to_string(), value);
            }
        }
    }
    fields
}
