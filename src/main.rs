//! Outbound HTTP call logger: bootstrap binary.
//!
//! Loads a logger configuration, instruments a hyper-util client with it,
//! issues GET requests and prints the resulting call statistics.
//!
//! ```text
//! outbound-http-logger --config loggers.toml http://localhost:9000/ http://example.com/ --repeat 3
//! ```

use std::path::PathBuf;

use bytes::Bytes;
use clap::Parser;
use http::{Request, Response, Uri};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tower::{ServiceBuilder, ServiceExt};

use outbound_http_logger::config::{load_config, InstrumentationConfig};
use outbound_http_logger::observability::{init_logging, init_metrics};
use outbound_http_logger::{Instrumentation, InstrumentedBody, TrackedBody};

#[derive(Parser)]
#[command(name = "outbound-http-logger")]
#[command(about = "Issue instrumented GET requests and report outbound call stats", long_about = None)]
struct Cli {
    /// Logger configuration file (TOML). Defaults to one tracing logger.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Send each request this many times, concurrently.
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,

    /// Target URLs.
    #[arg(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => InstrumentationConfig::default(),
    };
    if config.loggers.is_empty() {
        config.loggers.push(Default::default());
    }

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        loggers = config.loggers.len(),
        "outbound-http-logger starting"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let instrumentation = Instrumentation::global();
    instrumentation.register_config(&config)?;

    let client: Client<HttpConnector, InstrumentedBody<Empty<Bytes>>> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let service = ServiceBuilder::new()
        .layer(instrumentation.layer())
        .service(client);

    let mut tasks = tokio::task::JoinSet::new();
    for url in &cli.urls {
        for _ in 0..cli.repeat {
            let request = Request::get(url.as_str()).body(Empty::<Bytes>::new())?;
            let service = service.clone();
            tasks.spawn(async move {
                let uri = request.uri().clone();
                match service.oneshot(request).await {
                    Ok(response) => drain(uri, response).await,
                    Err(e) => tracing::warn!(%uri, error = %e, "Request failed"),
                }
            });
        }
    }
    while tasks.join_next().await.is_some() {}

    instrumentation.print_stats();
    println!("{}", serde_json::to_string_pretty(&instrumentation.stats())?);
    Ok(())
}

/// Read the response to end of stream so the call completes.
async fn drain(uri: Uri, response: Response<TrackedBody<Incoming>>) {
    let status = response.status();
    match response.into_body().collect().await {
        Ok(body) => tracing::debug!(
            %uri,
            status = status.as_u16(),
            bytes = body.to_bytes().len(),
            "Response complete"
        ),
        Err(e) => tracing::warn!(%uri, error = %e, "Response body failed"),
    }
}
