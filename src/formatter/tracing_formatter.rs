//! Default sink: events as structured `tracing` records.

use crate::events::{EndEvent, StartEvent};
use crate::formatter::Formatter;

/// Target used for every record, so events can be filtered with
/// `RUST_LOG=outbound_http=info`.
pub const TARGET: &str = "outbound_http";

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFormatter;

impl Formatter for TracingFormatter {
    fn on_request_start(&self, event: StartEvent) {
        tracing::info!(
            target: TARGET,
            name = event.name.as_deref().unwrap_or(""),
            method = %event.method,
            url = %event.url,
            timestamp = %event.timestamp.to_rfc3339(),
            headers = ?event.headers,
            content_length = ?event.content.as_ref().map(|c| c.content_length),
            body = ?event.content.as_ref().and_then(|c| c.body.as_ref()),
            "Request start"
        );
    }

    fn on_request_end(&self, event: EndEvent) {
        tracing::info!(
            target: TARGET,
            name = event.name.as_deref().unwrap_or(""),
            method = %event.method,
            url = %event.url,
            status = event.res_status,
            timestamp = %event.timestamp.to_rfc3339(),
            headers = ?event.headers,
            req_ms = ?event.timing.map(|t| t.req_ms),
            total_ms = ?event.timing.map(|t| t.total_ms),
            socket_assignment_ms = ?event.timing.map(|t| t.socket_assignment_ms),
            read_content_size = event.content.read_content_size,
            body = ?event.content.body,
            "Request end"
        );
    }
}
