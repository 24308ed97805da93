//! Tower layer wrapping an HTTP client service.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use tower::{Layer, Service};

use crate::intercept::body::{BoxError, InstrumentedBody, TrackedBody};
use crate::intercept::instrumentation::Instrumentation;
use crate::intercept::marker::TrackedCall;
use crate::tracking::CallTracker;

/// Applies [`OutboundLogger`] to a client service.
#[derive(Debug, Clone)]
pub struct OutboundLoggerLayer {
    instrumentation: Instrumentation,
}

impl OutboundLoggerLayer {
    pub fn new(instrumentation: Instrumentation) -> Self {
        Self { instrumentation }
    }
}

impl<S> Layer<S> for OutboundLoggerLayer {
    type Service = OutboundLogger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OutboundLogger {
            inner,
            instrumentation: self.instrumentation.clone(),
        }
    }
}

/// Client service that tracks every call it forwards while its
/// instrumentation is enabled.
#[derive(Debug, Clone)]
pub struct OutboundLogger<S> {
    inner: S,
    instrumentation: Instrumentation,
}

impl<S> OutboundLogger<S> {
    pub fn new(inner: S, instrumentation: Instrumentation) -> Self {
        Self {
            inner,
            instrumentation,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for OutboundLogger<S>
where
    S: Service<Request<InstrumentedBody<ReqBody>>, Response = Response<ResBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    ReqBody: Body<Data = Bytes> + Send + 'static,
    ReqBody::Error: Into<BoxError>,
    ResBody: Body<Data = Bytes>,
{
    type Response = Response<TrackedBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The ready service is the one in `self`; take it and leave a clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !self.instrumentation.is_enabled() || req.extensions().get::<TrackedCall>().is_some() {
            let req = req.map(InstrumentedBody::passthrough);
            return Box::pin(async move {
                let res = inner.call(req).await?;
                Ok(res.map(TrackedBody::untracked))
            });
        }

        req.extensions_mut().insert(TrackedCall);
        let tracker = Arc::new(self.instrumentation.track(&req));

        Box::pin(async move {
            let req = instrument_request(req, &tracker).await;
            match inner.call(req).await {
                Ok(res) => {
                    tracker.response_received(res.status(), res.headers());
                    let (parts, body) = res.into_parts();
                    let body = if body.is_end_stream() {
                        tracker.stream_ended();
                        TrackedBody::untracked(body)
                    } else {
                        TrackedBody::new(body, tracker)
                    };
                    Ok(Response::from_parts(parts, body))
                }
                Err(e) => {
                    tracing::debug!(
                        call_id = %tracker.call_id(),
                        error = %e,
                        "Outbound call failed before response"
                    );
                    Err(e)
                }
            }
        })
    }
}

/// Wrap the request body, buffering it first when a matched logger will
/// parse it. The gate only allows buffering for bodies of exact, bounded size.
async fn instrument_request<B>(
    req: Request<B>,
    tracker: &Arc<CallTracker>,
) -> Request<InstrumentedBody<B>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if !tracker.wants_request_body() {
        return req.map(|body| InstrumentedBody::tracked(body, tracker.clone()));
    }

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => {
            let trailers = collected.trailers().cloned();
            let data = collected.to_bytes();
            tracker.set_request_body(data.clone());
            InstrumentedBody::buffered(data, trailers, tracker.clone())
        }
        Err(e) => {
            let error: BoxError = e.into();
            tracing::debug!(
                call_id = %tracker.call_id(),
                error = %error,
                "Request body failed while buffering"
            );
            InstrumentedBody::failed(error, tracker.clone())
        }
    };
    Request::from_parts(parts, body)
}
