//! Outbound webhook forwarding.
//!
//! # Responsibilities
//! - Re-send the original body to the resolved target
//! - Preserve the inbound method and `X-` headers, set a JSON content type
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` shared by all request tasks
//! - No retries: a failed forward is reported to the caller
//! - The target's response status is returned for logging only

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::http::request::forwarded_headers;

/// A webhook could not be delivered to its target.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("error creating request to target server: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("error while making request to target server: {0}")]
    Send(#[from] reqwest::Error),
}

/// Sends webhooks on to their resolved targets.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Forward `body` to `target`.
    pub async fn forward(
        &self,
        method: Method,
        target: &str,
        inbound: &HeaderMap,
        body: Bytes,
    ) -> Result<StatusCode, ForwardError> {
        let url = Url::parse(target)?;

        let response = self
            .client
            .request(method, url)
            .headers(forwarded_headers(inbound))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relative_target_is_rejected() {
        let forwarder = Forwarder::new(Duration::from_secs(1)).unwrap();
        let err = forwarder
            .forward(Method::POST, "fallthrough", &HeaderMap::new(), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::InvalidTarget(_)));
        assert!(err.to_string().starts_with("error creating request to target server: "));
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let forwarder = Forwarder::new(Duration::from_secs(2)).unwrap();
        // Port 1 on loopback is not listening.
        let err = forwarder
            .forward(Method::POST, "http://127.0.0.1:1/hook", &HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Send(_)));
        assert!(err.to_string().starts_with("error while making request to target server: "));
    }
}
