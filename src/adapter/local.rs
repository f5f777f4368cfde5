//! In-memory adapter for tests and embedded invocation.
//!
//! Doubles as the reference implementation for custom hosts: it holds the
//! same state every adapter needs (method, metadata, buffered body) without
//! any framework behind it.

use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::adapter::{HostAdapter, encode_json};
use crate::context::RequestContext;
use crate::error::DispatchError;

/// Adapter over a hand-built request, producing a [`LocalResponse`].
#[derive(Debug)]
pub struct LocalAdapter {
    method: Method,
    context: RequestContext,
    body: Option<Vec<u8>>,
}

impl Default for LocalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAdapter {
    /// An empty POST request with default metadata.
    pub fn new() -> Self {
        Self {
            method: Method::POST,
            context: RequestContext::default(),
            body: None,
        }
    }

    /// Sets the request body to the JSON serialization of `value`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.body = Some(encode_json(value).into_bytes());
        self
    }

    /// Sets the request body to raw text, JSON or otherwise.
    pub fn text(mut self, raw: impl Into<String>) -> Self {
        self.body = Some(raw.into().into_bytes());
        self
    }

    /// Overrides the request method.
    ///
    /// Named `with_method` so the [`HostAdapter::method`] accessor stays
    /// callable; an inherent `method` would shadow it.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.context.host = Some(host.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context
            .headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.query.insert(name.into(), value.into());
        self
    }

    /// Replaces the whole request context.
    pub fn request_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Outcome of a locally dispatched call.
#[derive(Debug, Clone)]
pub struct LocalResponse {
    pub status: StatusCode,
    /// Decoded JSON response body: the return value on success, the error
    /// envelope on failure.
    pub body: Value,
}

impl LocalResponse {
    /// Message from the error envelope, when this is a failure response.
    pub fn error_message(&self) -> Option<&str> {
        self.body["error"]["message"].as_str()
    }
}

impl HostAdapter for LocalAdapter {
    type Response = LocalResponse;

    fn method(&self) -> &Method {
        &self.method
    }

    fn raw_body(&self) -> Option<&[u8]> {
        self.body.as_deref().filter(|raw| !raw.is_empty())
    }

    fn raw_context(&self) -> &RequestContext {
        &self.context
    }

    fn send_result(self, value: &Value) -> LocalResponse {
        LocalResponse {
            status: StatusCode::OK,
            body: value.clone(),
        }
    }

    fn send_error(self, error: &DispatchError) -> LocalResponse {
        LocalResponse {
            status: error.status(),
            body: serde_json::to_value(error.wire()).unwrap_or(Value::Null),
        }
    }
}
