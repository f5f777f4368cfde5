//! Adapter for hosts that expose plain `http` request/response types.
//!
//! Covers hyper services, tower stacks, and serverless shims that hand the
//! integrator an `http::Request` whose body they have already buffered. The
//! response side is an `http::Response<String>` carrying JSON, which every
//! such host knows how to write back.

use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response, StatusCode};
use serde_json::Value;

use crate::adapter::{HostAdapter, encode_json};
use crate::context::RequestContext;
use crate::error::DispatchError;

/// Per-request adapter over buffered `http` types.
#[derive(Debug)]
pub struct HttpAdapter {
    method: Method,
    context: RequestContext,
    body: Vec<u8>,
}

impl HttpAdapter {
    /// Wraps a request whose body the host has already collected into bytes.
    pub fn new<B: AsRef<[u8]>>(request: Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        let context = RequestContext::from_parts(&parts);

        Self {
            method: parts.method,
            context,
            body: body.as_ref().to_vec(),
        }
    }
}

impl HostAdapter for HttpAdapter {
    type Response = Response<String>;

    fn method(&self) -> &Method {
        &self.method
    }

    fn raw_body(&self) -> Option<&[u8]> {
        if self.body.is_empty() {
            None
        } else {
            Some(&self.body)
        }
    }

    fn raw_context(&self) -> &RequestContext {
        &self.context
    }

    fn send_result(self, value: &Value) -> Response<String> {
        json_response(StatusCode::OK, encode_json(value))
    }

    fn send_error(self, error: &DispatchError) -> Response<String> {
        json_response(error.status(), encode_json(&error.wire()))
    }
}

fn json_response(status: StatusCode, body: String) -> Response<String> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .expect("static response parts are valid")
}
