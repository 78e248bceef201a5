//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use webhook_filter::config::FilterConfig;
use webhook_filter::http::HttpServer;
use webhook_filter::lifecycle::Shutdown;
use webhook_filter::routing::{RuleSet, RuleSpec};

/// A request as seen by the mock target.
#[derive(Debug)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Start a mock target on an ephemeral port that records every request and
/// answers with `status`.
pub async fn start_capture_target(status: StatusCode) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new()
        .fallback(
            move |State(tx): State<mpsc::UnboundedSender<Captured>>,
             method: Method,
             uri: axum::http::Uri,
             headers: HeaderMap,
             body: Bytes| async move {
                let _ = tx.send(Captured {
                    method,
                    path: uri.path().to_string(),
                    query: uri.query().map(str::to_string),
                    headers,
                    body,
                });
                status
            },
        )
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}

/// A running filter bound to an ephemeral port.
pub struct TestFilter {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestFilter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestFilter {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the filter with `rules` and default settings otherwise.
pub async fn start_filter(rules: Vec<RuleSpec>) -> TestFilter {
    let mut config = FilterConfig::default();
    config.timeouts.forward_secs = 2;
    config.timeouts.shutdown_grace_secs = 1;

    let rules = RuleSet::from_specs(rules).unwrap();
    let server = HttpServer::new(config, rules).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestFilter { addr, shutdown }
}

/// Client without pooling or proxies, so every request opens a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Wait briefly for a captured request; `None` if nothing arrives.
pub async fn next_capture(rx: &mut mpsc::UnboundedReceiver<Captured>) -> Option<Captured> {
    tokio::time::timeout(Duration::from_millis(500), rx.recv())
        .await
        .ok()
        .flatten()
}
