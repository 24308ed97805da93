//! Body wrappers carrying lifecycle signals.
//!
//! # Responsibilities
//! - [`InstrumentedBody`]: report socket assignment the first time the
//!   transport touches the request body; replay a buffered body unchanged
//! - [`TrackedBody`]: feed response data frames to the tracker and report
//!   end of stream exactly once

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use http::HeaderMap;
use http_body::{Body, Frame, SizeHint};
use pin_project_lite::pin_project;

use crate::tracking::CallTracker;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pin_project! {
    #[project = KindProj]
    #[derive(Debug)]
    enum Kind<B> {
        Streaming {
            #[pin]
            body: B,
        },
        Buffered {
            data: Option<Bytes>,
            trailers: Option<HeaderMap>,
        },
        Failed {
            error: Option<BoxError>,
        },
    }
}

pin_project! {
    /// Request body handed to the wrapped transport.
    #[derive(Debug)]
    pub struct InstrumentedBody<B> {
        #[pin]
        kind: Kind<B>,
        tracker: Option<Arc<CallTracker>>,
    }
}

impl<B> InstrumentedBody<B> {
    /// Forward `body` without any tracking.
    pub fn passthrough(body: B) -> Self {
        Self {
            kind: Kind::Streaming { body },
            tracker: None,
        }
    }

    pub(crate) fn tracked(body: B, tracker: Arc<CallTracker>) -> Self {
        Self {
            kind: Kind::Streaming { body },
            tracker: Some(tracker),
        }
    }

    pub(crate) fn buffered(
        data: Bytes,
        trailers: Option<HeaderMap>,
        tracker: Arc<CallTracker>,
    ) -> Self {
        Self {
            kind: Kind::Buffered {
                data: (!data.is_empty()).then_some(data),
                trailers,
            },
            tracker: Some(tracker),
        }
    }

    pub(crate) fn failed(error: BoxError, tracker: Arc<CallTracker>) -> Self {
        Self {
            kind: Kind::Failed { error: Some(error) },
            tracker: Some(tracker),
        }
    }

    fn signal_socket(&self) {
        if let Some(tracker) = &self.tracker {
            tracker.socket_assigned();
        }
    }
}

impl<B> Body for InstrumentedBody<B>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.signal_socket();
        match self.project().kind.project() {
            KindProj::Streaming { body } => body.poll_frame(cx).map_err(Into::into),
            KindProj::Buffered { data, trailers } => {
                if let Some(data) = data.take() {
                    return Poll::Ready(Some(Ok(Frame::data(data))));
                }
                Poll::Ready(trailers.take().map(|t| Ok(Frame::trailers(t))))
            }
            KindProj::Failed { error } => Poll::Ready(error.take().map(Err)),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.signal_socket();
        match &self.kind {
            Kind::Streaming { body } => body.is_end_stream(),
            Kind::Buffered { data, trailers } => data.is_none() && trailers.is_none(),
            Kind::Failed { error } => error.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        self.signal_socket();
        match &self.kind {
            Kind::Streaming { body } => body.size_hint(),
            Kind::Buffered { data, .. } => {
                SizeHint::with_exact(data.as_ref().map_or(0, |d| d.len() as u64))
            }
            Kind::Failed { .. } => SizeHint::default(),
        }
    }
}

pin_project! {
    /// Response body returned to the caller.
    #[derive(Debug)]
    pub struct TrackedBody<B> {
        #[pin]
        inner: B,
        tracker: Option<Arc<CallTracker>>,
    }
}

impl<B> TrackedBody<B> {
    pub(crate) fn new(inner: B, tracker: Arc<CallTracker>) -> Self {
        Self {
            inner,
            tracker: Some(tracker),
        }
    }

    /// Forward `inner` without any tracking.
    pub fn untracked(inner: B) -> Self {
        Self {
            inner,
            tracker: None,
        }
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

fn finish(tracker: &mut Option<Arc<CallTracker>>) {
    if let Some(tracker) = tracker.take() {
        tracker.stream_ended();
    }
}

impl<B> Body for TrackedBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        let result = ready!(this.inner.as_mut().poll_frame(cx));
        match &result {
            Some(Ok(frame)) => {
                if let (Some(tracker), Some(data)) = (this.tracker.as_ref(), frame.data_ref()) {
                    tracker.data_received(data);
                }
                if this.inner.is_end_stream() {
                    finish(this.tracker);
                }
            }
            // A failed stream never ends, even if polled to `None` afterwards.
            Some(Err(_)) => {
                this.tracker.take();
            }
            None => finish(this.tracker),
        }
        Poll::Ready(result)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::Instrumentation;
    use crate::tracking::CallPhase;
    use futures_util::stream;
    use http::{Request, StatusCode};
    use http_body_util::{BodyExt, Empty, Full, StreamBody};

    fn idle_tracker() -> Arc<CallTracker> {
        let req = Request::get("http://localhost:9000/")
            .body(Empty::<Bytes>::new())
            .unwrap();
        Arc::new(Instrumentation::new().track(&req))
    }

    #[tokio::test]
    async fn buffered_body_replays_data_then_trailers() {
        let tracker = idle_tracker();
        let mut trailers = HeaderMap::new();
        trailers.insert("x-checksum", "abc".parse().unwrap());

        let body = InstrumentedBody::<Full<Bytes>>::buffered(
            Bytes::from_static(b"{\"a\":1}"),
            Some(trailers.clone()),
            tracker,
        );
        assert_eq!(body.size_hint().exact(), Some(7));

        let collected = body.collect().await.unwrap();
        assert_eq!(collected.trailers(), Some(&trailers));
        assert_eq!(collected.to_bytes(), Bytes::from_static(b"{\"a\":1}"));
    }

    #[tokio::test]
    async fn failed_body_yields_its_error_once() {
        let tracker = idle_tracker();
        let mut body = InstrumentedBody::<Full<Bytes>>::failed("boom".into(), tracker);
        assert!(!body.is_end_stream());
        let err = body.frame().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(body.frame().await.is_none());
    }

    #[tokio::test]
    async fn passthrough_streams_unchanged() {
        let body = InstrumentedBody::passthrough(Full::new(Bytes::from_static(b"hi")));
        assert_eq!(body.collect().await.unwrap().to_bytes(), "hi");

        let body = TrackedBody::untracked(Full::new(Bytes::from_static(b"yo")));
        assert_eq!(body.collect().await.unwrap().to_bytes(), "yo");
    }

    #[tokio::test]
    async fn error_frame_detaches_tracker() {
        let tracker = idle_tracker();
        tracker.socket_assigned();
        tracker.response_received(StatusCode::OK, &HeaderMap::new());

        let frames: Vec<Result<Frame<Bytes>, BoxError>> = vec![
            Ok(Frame::data(Bytes::from_static(b"ab"))),
            Err("reset".into()),
        ];
        let mut body = TrackedBody::new(StreamBody::new(stream::iter(frames)), tracker.clone());

        assert!(body.frame().await.unwrap().is_ok());
        assert!(body.frame().await.unwrap().is_err());
        assert!(body.frame().await.is_none());
        assert_eq!(tracker.phase(), CallPhase::ResponseReceived);
    }
}
