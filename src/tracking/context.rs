//! Per-call lifecycle state.
//!
//! A [`RequestContext`] records the timestamps, derived durations and captured
//! data of exactly one outbound call. It is a forward-only state machine:
//!
//! ```text
//! Initiated ──socket──▶ SocketAssigned ──headers──▶ ResponseReceived ──end──▶ Ended
//! ```
//!
//! Each transition method returns `true` only when it moved the phase.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use http::{HeaderMap, Method, StatusCode};

use crate::events::BodyGate;
use crate::tracking::call_id::CallId;
use crate::tracking::target::CallTarget;

/// Lifecycle phase of a tracked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallPhase {
    /// Intercepted, waiting for the transport.
    Initiated,
    /// The transport picked the request up on a connection.
    SocketAssigned,
    /// Response headers arrived.
    ResponseReceived,
    /// The response body reached end of stream. Terminal.
    Ended,
}

/// Mutable state of one outbound call.
#[derive(Debug)]
pub struct RequestContext {
    call_id: CallId,
    method: Method,
    target: CallTarget,
    request_headers: HeaderMap,
    request_gate: BodyGate,
    request_body: Option<Bytes>,

    started_at: DateTime<Utc>,
    call_start: Instant,
    socket_assigned: Option<Instant>,
    response_received: Option<Instant>,
    stream_ended: Option<Instant>,

    socket_assignment_time: Option<Duration>,
    request_time: Option<Duration>,
    total_time: Option<Duration>,

    response_status: Option<StatusCode>,
    response_headers: Option<HeaderMap>,
    response_gate: BodyGate,
    response_body: Option<BytesMut>,
    response_capture_limit: usize,
    content_length: u64,

    phase: CallPhase,
}

impl RequestContext {
    /// Start tracking a call now.
    pub fn new(
        call_id: CallId,
        method: Method,
        target: CallTarget,
        request_headers: HeaderMap,
        request_gate: BodyGate,
    ) -> Self {
        Self {
            call_id,
            method,
            target,
            request_headers,
            request_gate,
            request_body: None,
            started_at: Utc::now(),
            call_start: Instant::now(),
            socket_assigned: None,
            response_received: None,
            stream_ended: None,
            socket_assignment_time: None,
            request_time: None,
            total_time: None,
            response_status: None,
            response_headers: None,
            response_gate: BodyGate::default(),
            response_body: None,
            response_capture_limit: 0,
            content_length: 0,
            phase: CallPhase::Initiated,
        }
    }

    /// Store the request payload written by the caller.
    pub fn set_request_body(&mut self, body: Bytes) {
        self.request_body = Some(body);
    }

    pub fn mark_socket_assigned(&mut self) -> bool {
        if self.phase != CallPhase::Initiated {
            return false;
        }
        let now = Instant::now();
        self.socket_assigned = Some(now);
        self.socket_assignment_time = Some(now.duration_since(self.call_start));
        self.phase = CallPhase::SocketAssigned;
        true
    }

    /// Record response headers. `capture` enables buffering of the response
    /// body up to the length declared by `gate`.
    pub fn mark_response_received(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
        gate: BodyGate,
        capture: bool,
    ) -> bool {
        if self.phase != CallPhase::SocketAssigned {
            return false;
        }
        let now = Instant::now();
        self.response_received = Some(now);
        self.request_time = self.socket_assigned.map(|s| now.duration_since(s));
        self.response_status = Some(status);
        self.response_headers = Some(headers);

        let limit = gate
            .inspectable_length()
            .and_then(|len| usize::try_from(len).ok());
        match limit {
            Some(limit) if capture => {
                self.response_capture_limit = limit;
                self.response_body = Some(BytesMut::with_capacity(limit));
            }
            _ => {
                self.response_capture_limit = 0;
                self.response_body = None;
            }
        }
        self.response_gate = gate;
        self.phase = CallPhase::ResponseReceived;
        true
    }

    /// Account for one response data chunk.
    pub fn record_chunk(&mut self, chunk: &[u8]) {
        if self.phase != CallPhase::ResponseReceived {
            return;
        }
        self.content_length += chunk.len() as u64;

        if let Some(buffer) = self.response_body.as_mut() {
            if buffer.len() + chunk.len() > self.response_capture_limit {
                // More than declared: stop capturing, keep counting.
                self.response_body = None;
            } else {
                buffer.extend_from_slice(chunk);
            }
        }
    }

    pub fn mark_stream_ended(&mut self) -> bool {
        if self.phase != CallPhase::ResponseReceived {
            return false;
        }
        // Fewer bytes than declared (HEAD, 304): nothing complete to parse.
        if self
            .response_body
            .as_ref()
            .is_some_and(|buffer| buffer.len() != self.response_capture_limit)
        {
            self.response_body = None;
        }
        let now = Instant::now();
        self.stream_ended = Some(now);
        self.total_time = Some(now.duration_since(self.call_start));
        self.phase = CallPhase::Ended;
        true
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &CallTarget {
        &self.target
    }

    pub fn url(&self) -> &str {
        &self.target.url
    }

    pub fn host(&self) -> &str {
        &self.target.host
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn request_gate(&self) -> &BodyGate {
        &self.request_gate
    }

    pub fn request_body(&self) -> Option<&Bytes> {
        self.request_body.as_ref()
    }

    pub fn socket_assignment_time(&self) -> Option<Duration> {
        self.socket_assignment_time
    }

    pub fn request_time(&self) -> Option<Duration> {
        self.request_time
    }

    pub fn total_time(&self) -> Option<Duration> {
        self.total_time
    }

    pub fn response_status(&self) -> Option<StatusCode> {
        self.response_status
    }

    pub fn response_headers(&self) -> Option<&HeaderMap> {
        self.response_headers.as_ref()
    }

    pub fn response_gate(&self) -> &BodyGate {
        &self.response_gate
    }

    /// Captured response body, present only when capture was requested and
    /// the stream stayed within its declared length. After stream end it is
    /// present only if exactly the declared length arrived.
    pub fn response_body(&self) -> Option<&[u8]> {
        self.response_body.as_deref()
    }

    /// Response bytes observed so far.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Ordered lifecycle timestamps: call start, socket, response, end.
    pub fn timestamps(&self) -> (Instant, Option<Instant>, Option<Instant>, Option<Instant>) {
        (
            self.call_start,
            self.socket_assigned,
            self.response_received,
            self.stream_ended,
        )
    }
}
