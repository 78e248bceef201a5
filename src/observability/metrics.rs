//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_requests_total` (counter): webhooks handled, by outcome
//! - `webhook_forward_duration_seconds` (histogram): outbound forward latency
//! - `webhook_rules_loaded` (gauge): size of the active rule set
//!
//! # Design Decisions
//! - Metric calls go through the `metrics` facade and are no-ops until a
//!   recorder is installed, so tests need no setup
//! - Probe requests are not counted

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a webhook request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    NoMatch,
    InvalidBody,
    InvalidRef,
    ForwardError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Forwarded => "forwarded",
            Outcome::NoMatch => "no_match",
            Outcome::InvalidBody => "invalid_body",
            Outcome::InvalidRef => "invalid_ref",
            Outcome::ForwardError => "forward_error",
        }
    }
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!("webhook_requests_total", "Webhook requests handled, by outcome");
    metrics::describe_histogram!(
        "webhook_forward_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent forwarding a webhook to its target"
    );
    metrics::describe_gauge!("webhook_rules_loaded", "Number of configured rules");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_outcome(outcome: Outcome) {
    metrics::counter!("webhook_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_forward(start: Instant) {
    metrics::histogram!("webhook_forward_duration_seconds").record(start.elapsed().as_secs_f64());
}
