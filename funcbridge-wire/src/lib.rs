//! Wire-level envelopes for the funcbridge call protocol.
//!
//! One HTTP exchange carries exactly one call. The request body is a
//! [`CallEnvelope`] naming the target function and its positional arguments;
//! the response body is either the function's return value serialized
//! directly, or an [`ErrorEnvelope`] when the call failed. These types are
//! kept in their own crate so client bindings can share them with the server
//! without pulling in any HTTP machinery.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// JSON request body carrying one function call.
///
/// Both fields are optional on the wire: a handler registered alone needs no
/// `name`, and a call without arguments may omit `args` entirely (an absent
/// list is treated as empty by the dispatcher).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallEnvelope {
    /// Name of the registered function to invoke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Positional arguments, spread into the call in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
}

impl CallEnvelope {
    /// Creates an envelope addressing `name` with the given arguments.
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: Some(name.into()),
            args: Some(args),
        }
    }

    /// Creates an envelope with arguments only, for single-function handlers.
    pub fn anonymous(args: Vec<Value>) -> Self {
        Self {
            name: None,
            args: Some(args),
        }
    }

    /// Parses an envelope out of raw body bytes.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::NotJson`] when the bytes are not valid JSON
    /// and [`EnvelopeError::NotAnObject`] when they decode to something other
    /// than a JSON object.
    pub fn parse(raw: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|err| EnvelopeError::NotJson(err.to_string()))?;
        Self::from_value(value)
    }

    /// Converts an already-decoded JSON value into an envelope.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::NotAnObject`] unless the value is an object.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject(json_kind(&value)));
        }

        serde_json::from_value(value).map_err(|err| EnvelopeError::InvalidShape(err.to_string()))
    }

    /// Returns the argument list, treating an absent field as empty.
    pub fn into_args(self) -> Vec<Value> {
        self.args.unwrap_or_default()
    }
}

/// Errors produced while decoding a [`CallEnvelope`] from a request body.
#[derive(Debug, Error, Clone)]
pub enum EnvelopeError {
    #[error("request body is not valid JSON: {0}")]
    NotJson(String),
    #[error("call envelope must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("invalid call envelope: {0}")]
    InvalidShape(String),
}

/// JSON response body for a failed call: `{ "error": { "message", "code" } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

/// The payload inside an [`ErrorEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable failure message.
    pub message: String,
    /// Machine-readable error kind, when the server supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorEnvelope {
    /// Builds an error envelope with a message and kind code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                code: Some(code.into()),
            },
        }
    }

    /// Builds an error envelope carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                code: None,
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
