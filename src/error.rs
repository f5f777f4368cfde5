use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use funcbridge_wire::{EnvelopeError, ErrorEnvelope};
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Boxed error returned by registered handlers and context projections.
///
/// Only its `Display` output ever reaches the wire.
pub type CallError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of one dispatched call, mapped onto the wire as
/// `{ "error": { "message", "code" } }` with a kind-specific HTTP status.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request body present but not a valid JSON call envelope.
    #[error("{0}")]
    MalformedPayload(String),
    /// Requested name absent from the registry.
    #[error("{0}")]
    UnknownFunction(String),
    /// The resolved function (or its context projection) failed.
    #[error("{0}")]
    CallFailure(String),
}

impl DispatchError {
    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownFunction(format!("unknown function: {name}"))
    }

    pub(crate) fn unnamed() -> Self {
        Self::UnknownFunction("call envelope does not name a function".to_owned())
    }

    /// HTTP status carried by the failure response.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::UnknownFunction(_) => StatusCode::NOT_FOUND,
            Self::CallFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error kind placed in the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::UnknownFunction(_) => "unknown_function",
            Self::CallFailure(_) => "call_failure",
        }
    }

    /// Builds the JSON body for the failure response.
    pub fn wire(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.to_string(), self.code())
    }
}

impl From<EnvelopeError> for DispatchError {
    fn from(err: EnvelopeError) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.wire())).into_response()
    }
}

/// Top-level error for the embedded serve loop.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_and_code_follow_kind() {
        let err = DispatchError::unknown("nope");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "unknown_function");

        let err = DispatchError::MalformedPayload("bad body".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "malformed_payload");

        let err = DispatchError::CallFailure("boom".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "call_failure");
    }

    #[test]
    fn call_failure_message_is_verbatim() {
        let err = DispatchError::CallFailure("bad".into());
        let body = serde_json::to_value(err.wire()).unwrap();
        assert_eq!(
            body,
            json!({ "error": { "message": "bad", "code": "call_failure" } })
        );
    }
}
