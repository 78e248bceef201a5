//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the webhook handler on every path and method
//! - Wire up middleware (request spans, request timeout)
//! - Bind server to listener, drain on shutdown with a deadline
//! - Short-circuit Kubernetes probes
//! - Run each webhook through extraction, rule resolution and forwarding
//! - Observability (logs, metrics)

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FilterConfig;
use crate::http::forward::Forwarder;
use crate::http::request::is_probe;
use crate::http::response::{ok, WebhookError};
use crate::observability::metrics::{self, Outcome};
use crate::observability::tracing::make_request_span;
use crate::routing::{extract_ref, parse_payload, RuleSet};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleSet>,
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
}

/// HTTP server for the webhook filter.
pub struct HttpServer {
    router: Router,
    config: FilterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and rules.
    pub fn new(config: FilterConfig, rules: RuleSet) -> Result<Self, reqwest::Error> {
        let state = AppState {
            rules: Arc::new(rules),
            forwarder: Forwarder::new(config.timeouts.forward())?,
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FilterConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(webhook_handler))
            .route("/{*path}", any(webhook_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(config.timeouts.request()))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
    }

    /// The request router, for serving in-process (e.g. in tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight
    /// requests for at most `timeouts.shutdown_grace_secs`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "listening on {}", addr);

        let grace = self.config.timeouts.shutdown_grace();
        let mut deadline = shutdown.resubscribe();

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result?,
            _ = deadline.recv() => {
                tracing::info!(
                    grace_secs = grace.as_secs(),
                    "draining in-flight requests"
                );
                match tokio::time::timeout(grace, &mut server).await {
                    Ok(result) => result?,
                    Err(_) => tracing::warn!(
                        grace_secs = grace.as_secs(),
                        "in-flight requests did not finish before the shutdown deadline"
                    ),
                }
            }
        }

        tracing::info!("web server graceful shutdown");
        Ok(())
    }
}

/// Entry point for every inbound request.
async fn webhook_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    // Probes skip logging, metrics and the filter.
    if is_probe(request.headers()) {
        return ok();
    }

    match handle_webhook(&state, request).await {
        Ok(outcome) => {
            metrics::record_outcome(outcome);
            ok()
        }
        Err(e) => {
            metrics::record_outcome(e.outcome());
            e.into_response()
        }
    }
}

async fn handle_webhook(state: &AppState, request: Request<Body>) -> Result<Outcome, WebhookError> {
    let path = request.uri().path().to_string();
    tracing::info!(path = %path, "received request {}", path);

    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "error reading request body"))
        .map_err(WebhookError::ReadBody)?;

    let payload = parse_payload(&body)
        .inspect_err(|e| tracing::warn!(error = %e, "error parsing request body JSON"))
        .map_err(WebhookError::ParseBody)?;

    let git_ref = extract_ref(&payload)
        .inspect_err(|e| tracing::warn!(error = %e, "could not get ref from body"))
        .map_err(WebhookError::Ref)?;

    // An empty target (literal or rendered) counts as no target.
    let Some(target) = state.rules.resolve(git_ref, &payload).filter(|t| !t.is_empty()) else {
        tracing::info!(git_ref = %git_ref, "could not get target for ref {}", git_ref);
        return Ok(Outcome::NoMatch);
    };

    let start = Instant::now();
    let forwarded = state
        .forwarder
        .forward(parts.method, &target, &parts.headers, body)
        .await;
    metrics::record_forward(start);

    match forwarded {
        Ok(status) => {
            tracing::info!(
                git_ref = %git_ref,
                target = %target,
                status = status.as_u16(),
                "successfully forwarded request to {}",
                target
            );
            Ok(Outcome::Forwarded)
        }
        Err(e) => {
            tracing::error!(target = %target, error = %e, "error forwarding request to {}", target);
            Err(e.into())
        }
    }
}
