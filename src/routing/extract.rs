//! Webhook payload parsing and ref extraction.

use serde_json::Value;
use thiserror::Error;

/// The body could not be used as a webhook payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// The payload has no usable `ref`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("ref key does not exist in JSON")]
    MissingRef,

    #[error("ref is not a string (found {0})")]
    NotAString(&'static str),
}

/// Parse a request body into a JSON object payload.
pub fn parse_payload(body: &[u8]) -> Result<Value, PayloadError> {
    let payload: Value = serde_json::from_slice(body)?;
    if !payload.is_object() {
        return Err(PayloadError::NotAnObject(json_type(&payload)));
    }
    Ok(payload)
}

/// Read the top-level `ref` string from a payload.
pub fn extract_ref(payload: &Value) -> Result<&str, ExtractError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ExtractError::NotAnObject(json_type(payload)))?;

    match object.get("ref") {
        None => Err(ExtractError::MissingRef),
        Some(Value::String(git_ref)) => Ok(git_ref.as_str()),
        Some(other) => Err(ExtractError::NotAString(json_type(other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
