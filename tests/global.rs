//! Crate-level functions acting on the process-wide instance.
//!
//! Kept in its own test binary with a single test so nothing else touches the
//! global state.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use tower::{service_fn, ServiceBuilder, ServiceExt};

use outbound_http_logger::intercept::BoxError;
use outbound_http_logger::{Instrumentation, InstrumentedBody, LoggerOptions};

mod common;

#[tokio::test]
async fn crate_functions_drive_the_global_instance() {
    let sink = Arc::new(common::RecordingFormatter::default());
    outbound_http_logger::create(LoggerOptions::new().shared_formatter(sink.clone())).unwrap();
    assert!(outbound_http_logger::enable());
    assert!(!outbound_http_logger::enable());

    let transport = service_fn(|_req: Request<InstrumentedBody<Full<Bytes>>>| async {
        Ok::<_, BoxError>(Response::new(Full::new(Bytes::from_static(b"ok"))))
    });
    let service = ServiceBuilder::new()
        .layer(Instrumentation::global().layer())
        .service(transport);
    let res = service
        .oneshot(Request::get("http://api.local/health/").body(Full::new(Bytes::new())).unwrap())
        .await
        .unwrap();
    res.into_body().collect().await.unwrap();

    let stats = outbound_http_logger::stats();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.urls["http://api.local/health/"], 1);
    assert_eq!(sink.ends().len(), 1);
    outbound_http_logger::print_stats();

    outbound_http_logger::clear();
    assert_eq!(outbound_http_logger::stats().count, 0);
    assert!(Instrumentation::global().loggers().is_empty());
    assert!(outbound_http_logger::disable());
}
