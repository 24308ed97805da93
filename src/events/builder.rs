//! Per-logger event construction.

use std::time::Duration;

use crate::config::LoggerConfig;
use crate::events::capture::{parse_json, BodyDirection};
use crate::events::types::{
    header_fields, EndEvent, RequestContent, ResponseContent, StartEvent, Timing,
};
use crate::events::CaptureError;
use crate::tracking::RequestContext;

/// Build the start event `options` asks for, if any.
pub fn build_start_event(
    options: &LoggerConfig,
    context: &RequestContext,
) -> Result<Option<StartEvent>, CaptureError> {
    if !options.request_start {
        return Ok(None);
    }

    let headers = options
        .request_headers
        .then(|| header_fields(context.request_headers()));

    let content = if options.request_json_body {
        request_content(options, context)?
    } else {
        None
    };

    Ok(Some(StartEvent {
        name: options.name.clone(),
        timestamp: context.started_at(),
        url: context.url().to_string(),
        method: context.method().to_string(),
        headers,
        content,
    }))
}

fn request_content(
    options: &LoggerConfig,
    context: &RequestContext,
) -> Result<Option<RequestContent>, CaptureError> {
    let gate = context.request_gate();
    let Some(content_length) = gate.inspectable_length() else {
        return Ok(None);
    };

    let body = match context.request_body() {
        Some(bytes) if gate.parses_json(options.json_body_max_length) => {
            Some(parse_json(bytes, BodyDirection::Request)?)
        }
        _ => None,
    };

    Ok(Some(RequestContent {
        content_length,
        body,
    }))
}

/// Build the end event `options` asks for, if any. Calls without a response
/// status never produce one.
pub fn build_end_event(
    options: &LoggerConfig,
    context: &RequestContext,
) -> Result<Option<EndEvent>, CaptureError> {
    if !options.request_end {
        return Ok(None);
    }
    let Some(status) = context.response_status() else {
        return Ok(None);
    };

    let headers = if options.response_headers {
        context.response_headers().map(header_fields)
    } else {
        None
    };

    let timing = if options.timing {
        timing(context)
    } else {
        None
    };

    let mut content = ResponseContent {
        read_content_size: context.content_length(),
        content_length: None,
        body: None,
    };
    if options.response_json_body
        && context
            .response_gate()
            .parses_json(options.json_body_max_length)
    {
        if let Some(bytes) = context.response_body() {
            content.content_length = Some(bytes.len() as u64);
            content.body = Some(parse_json(bytes, BodyDirection::Response)?);
        }
    }

    Ok(Some(EndEvent {
        name: options.name.clone(),
        timestamp: context.started_at(),
        res_status: status.as_u16(),
        url: context.url().to_string(),
        method: context.method().to_string(),
        headers,
        timing,
        content,
    }))
}

fn timing(context: &RequestContext) -> Option<Timing> {
    Some(Timing {
        req_ms: millis(context.request_time()?),
        total_ms: millis(context.total_time()?),
        socket_assignment_ms: millis(context.socket_assignment_time()?),
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
