//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::Empty;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use outbound_http_logger::{
    EndEvent, Formatter, Instrumentation, InstrumentedBody, LogEvent, LoggerHandle, LoggerOptions,
    StartEvent,
};

/// What the mock backend saw of one request.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

/// Reply sent by the mock backend.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl MockReply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json"),
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: body.into(),
        }
    }
}

/// Start a mock backend that returns a fixed JSON response.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { MockReply::json(response) }).await
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(ReceivedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let reply = f(request).await;
                        let status_text = match reply.status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let content_type = reply
                            .content_type
                            .map(|t| format!("Content-Type: {t}\r\n"))
                            .unwrap_or_default();
                        let response = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            content_type,
                            reply.body.len(),
                            reply.body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<ReceivedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(ReceivedRequest { head, body })
}

/// A real hyper-util client for bodiless requests.
pub fn http_client() -> Client<HttpConnector, InstrumentedBody<Empty<Bytes>>> {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Formatter keeping every event it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingFormatter {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingFormatter {
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn starts(&self) -> Vec<StartEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LogEvent::RequestStart(start) => Some(start),
                LogEvent::RequestEnd(_) => None,
            })
            .collect()
    }

    pub fn ends(&self) -> Vec<EndEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LogEvent::RequestEnd(end) => Some(end),
                LogEvent::RequestStart(_) => None,
            })
            .collect()
    }
}

impl Formatter for RecordingFormatter {
    fn on_request_start(&self, event: StartEvent) {
        self.events.lock().unwrap().push(event.into());
    }

    fn on_request_end(&self, event: EndEvent) {
        self.events.lock().unwrap().push(event.into());
    }
}

/// Register a logger on `inst` that records into a fresh sink.
pub fn recording_logger(
    inst: &Instrumentation,
    options: LoggerOptions,
) -> (LoggerHandle, Arc<RecordingFormatter>) {
    let sink = Arc::new(RecordingFormatter::default());
    let handle = inst
        .create(options.shared_formatter(sink.clone()))
        .unwrap();
    (handle, sink)
}
