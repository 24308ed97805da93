//! Metrics collection and exposition.
//!
//! # Metrics
//! - `outbound_http_calls_total` (counter): completed calls by host, status
//! - `outbound_http_call_duration_seconds` (histogram): call start to end of stream, by host
//! - `outbound_http_capture_failures_total` (counter): events that failed to build, by logger, event
//!
//! # Design Decisions
//! - Only completed calls are recorded; abandoned calls never reach stream end
//! - Labels stay low-cardinality: host, not full URL

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "outbound_http_calls_total",
        "Outbound HTTP calls that reached end of stream"
    );
    describe_histogram!(
        "outbound_http_call_duration_seconds",
        "Outbound call duration from interception to end of stream"
    );
    describe_counter!(
        "outbound_http_capture_failures_total",
        "Log events that could not be built"
    );
}

/// Record one completed call.
pub fn record_call(host: &str, status: u16, total: Duration) {
    counter!(
        "outbound_http_calls_total",
        "host" => host.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "outbound_http_call_duration_seconds",
        "host" => host.to_string(),
    )
    .record(total.as_secs_f64());
}

pub fn record_capture_failure(logger: &str, event: &str) {
    counter!(
        "outbound_http_capture_failures_total",
        "logger" => logger.to_string(),
        "event" => event.to_string(),
    )
    .increment(1);
}
