//! Responses to the webhook sender.
//!
//! # Responsibilities
//! - Plain-text `OK` for handled webhooks (forwarded or unmatched)
//! - Map per-request failures to `500` with a short diagnostic
//!
//! # Design Decisions
//! - An unmatched ref is not an error for the sender
//! - Error bodies are short and fixed, except for forward failures which
//!   include the underlying cause

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::forward::ForwardError;
use crate::observability::metrics::Outcome;
use crate::routing::{ExtractError, PayloadError};

/// Per-request failure. Never affects other requests or the rule set.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("error reading body")]
    ReadBody(#[source] axum::Error),

    #[error("error parsing body JSON")]
    ParseBody(#[source] PayloadError),

    #[error("could not get ref from body")]
    Ref(#[source] ExtractError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl WebhookError {
    pub fn outcome(&self) -> Outcome {
        match self {
            WebhookError::ReadBody(_) | WebhookError::ParseBody(_) => Outcome::InvalidBody,
            WebhookError::Ref(_) => Outcome::InvalidRef,
            WebhookError::Forward(_) => Outcome::ForwardError,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", self)).into_response()
    }
}

/// The reply for every handled webhook.
pub fn ok() -> Response {
    (StatusCode::OK, "OK").into_response()
}
