//! Lifecycle driver for one tracked call.
//!
//! # Responsibilities
//! - Own the call's [`RequestContext`] behind a lock shared by the request
//!   body, response future and response body wrappers
//! - Fix the matched-logger set for the call's lifetime
//! - Emit start events at socket assignment and end events at stream end
//! - Count the call in the stats aggregator exactly once
//!
//! Events are built under the context lock and handed to formatters after it
//! is released. Start emission claims a second lock before releasing the
//! context, so the end emission of the same call waits for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::events::{wants_request_capture, wants_response_capture, BodyGate, CaptureError};
use crate::observability::metrics;
use crate::registry::LoggerHandle;
use crate::stats::StatsAggregator;
use crate::tracking::call_id::CallId;
use crate::tracking::context::{CallPhase, RequestContext};

/// Shared lifecycle state of one outbound call.
#[derive(Debug)]
pub struct CallTracker {
    call_id: CallId,
    context: Mutex<RequestContext>,
    loggers: Vec<LoggerHandle>,
    stats: Arc<StatsAggregator>,
    socket_signalled: AtomicBool,
    emission: Mutex<()>,
}

impl CallTracker {
    pub fn new(
        context: RequestContext,
        loggers: Vec<LoggerHandle>,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        Self {
            call_id: context.call_id(),
            context: Mutex::new(context),
            loggers,
            stats,
            socket_signalled: AtomicBool::new(false),
            emission: Mutex::new(()),
        }
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Loggers matched at interception time.
    pub fn loggers(&self) -> &[LoggerHandle] {
        &self.loggers
    }

    pub fn phase(&self) -> CallPhase {
        self.lock().phase()
    }

    /// True if a matched logger will parse the request body.
    pub fn wants_request_body(&self) -> bool {
        wants_request_capture(&self.loggers, self.lock().request_gate())
    }

    pub fn set_request_body(&self, body: Bytes) {
        self.lock().set_request_body(body);
    }

    /// The transport picked the request up. Only the first signal counts.
    pub fn socket_assigned(&self) {
        if self.socket_signalled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.assign_socket(self.lock());
    }

    /// Response headers arrived.
    pub fn response_received(&self, status: StatusCode, headers: &HeaderMap) {
        self.socket_signalled.store(true, Ordering::Release);
        let mut ctx = self.lock();

        // The transport never touched the request body: assign the socket now so
        // the start event still precedes the response.
        if ctx.phase() == CallPhase::Initiated {
            self.assign_socket(ctx);
            ctx = self.lock();
        }

        let gate = BodyGate::for_response(headers);
        let capture = wants_response_capture(&self.loggers, &gate);
        if ctx.mark_response_received(status, headers.clone(), gate, capture) {
            tracing::trace!(
                call_id = %self.call_id,
                status = status.as_u16(),
                capture,
                "Response received"
            );
        }
    }

    /// One response data frame passed through.
    pub fn data_received(&self, chunk: &[u8]) {
        self.lock().record_chunk(chunk);
    }

    /// The response body reached end of stream.
    pub fn stream_ended(&self) {
        let mut ctx = self.lock();
        if !ctx.mark_stream_ended() {
            return;
        }

        let key = self.stats.record(ctx.url());
        if let (Some(status), Some(total)) = (ctx.response_status(), ctx.total_time()) {
            metrics::record_call(ctx.host(), status.as_u16(), total);
        }

        tracing::debug!(
            call_id = %self.call_id,
            url = %key,
            status = ?ctx.response_status().map(|s| s.as_u16()),
            total_ms = ?ctx.total_time().map(|d| d.as_millis()),
            bytes = ctx.content_length(),
            "Outbound call completed"
        );

        let events: Vec<_> = self.loggers.iter().map(|l| l.end_event(&ctx)).collect();
        drop(ctx);
        let _emitting = self.lock_emission();

        for (logger, event) in self.loggers.iter().zip(events) {
            match event {
                Ok(Some(event)) => logger.emit_end(event),
                Ok(None) => {}
                Err(e) => self.capture_failed(logger, "request_end", e),
            }
        }
    }

    fn assign_socket(&self, mut ctx: MutexGuard<'_, RequestContext>) {
        if !ctx.mark_socket_assigned() {
            return;
        }
        tracing::trace!(
            call_id = %self.call_id,
            url = %ctx.url(),
            matched = self.loggers.len(),
            "Socket assigned"
        );

        let events: Vec<_> = self.loggers.iter().map(|l| l.start_event(&ctx)).collect();
        let _emitting = self.lock_emission();
        drop(ctx);

        for (logger, event) in self.loggers.iter().zip(events) {
            match event {
                Ok(Some(event)) => logger.emit_start(event),
                Ok(None) => {}
                Err(e) => self.capture_failed(logger, "request_start", e),
            }
        }
    }

    fn capture_failed(&self, logger: &LoggerHandle, event: &'static str, error: CaptureError) {
        let name = logger.name().unwrap_or("<unnamed>");
        tracing::error!(
            call_id = %self.call_id,
            logger = %name,
            event,
            error = %error,
            "Failed to build event"
        );
        metrics::record_capture_failure(name, event);
    }

    fn lock(&self) -> MutexGuard<'_, RequestContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_emission(&self) -> MutexGuard<'_, ()> {
        self.emission.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CallTracker {
    fn drop(&mut self) {
        let phase = self
            .context
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .phase();
        if phase != CallPhase::Ended {
            tracing::debug!(
                call_id = %self.call_id,
                phase = ?phase,
                "Call abandoned before stream end"
            );
        }
    }
}
