//! Adapter for axum services.

use async_trait::async_trait;
use axum::body::{Bytes, to_bytes};
use axum::extract::{FromRequest, Request};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, RequestExt};
use serde_json::Value;

use crate::adapter::HostAdapter;
use crate::context::RequestContext;
use crate::error::DispatchError;

/// Per-request adapter over axum's native `Request`/`Response` pair.
///
/// Buffers the body up front so the dispatch itself stays synchronous over
/// the adapter. Buffering honors `DefaultBodyLimit`: the cap configured by
/// that middleware applies, axum's 2 MB default when none is installed, and
/// `DefaultBodyLimit::disable()` lifts it. An over-limit body is reported as
/// a malformed payload.
#[derive(Debug)]
pub struct AxumAdapter {
    method: Method,
    context: RequestContext,
    body: Bytes,
}

impl AxumAdapter {
    /// Builds an adapter from an axum request, consuming its body.
    ///
    /// # Errors
    /// Returns [`DispatchError::MalformedPayload`] when the body stream
    /// cannot be read or exceeds the host's body limit.
    pub async fn new(request: Request) -> Result<Self, DispatchError> {
        // with_limited_body applies the DefaultBodyLimit extension (or the
        // 2 MB default); the limit surfaces as a read error below, so no
        // extra cap is passed to to_bytes.
        let (parts, body) = request.with_limited_body().into_parts();
        let context = RequestContext::from_parts(&parts);
        let body = to_bytes(body, usize::MAX).await.map_err(|err| {
            DispatchError::MalformedPayload(format!("failed to read request body: {err}"))
        })?;

        Ok(Self {
            method: parts.method,
            context,
            body,
        })
    }
}

impl HostAdapter for AxumAdapter {
    type Response = Response;

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

    fn send_result(self, value: &Value) -> Response {
        (StatusCode::OK, Json(value)).into_response()
    }

    fn send_error(self, error: &DispatchError) -> Response {
        (error.status(), Json(error.wire())).into_response()
    }
}

/// Lets axum handlers take the adapter as an extractor.
#[async_trait]
impl<S> FromRequest<S> for AxumAdapter
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, _state: &S) -> Result<Self, Self::Rejection> {
        Self::new(request).await.map_err(IntoResponse::into_response)
    }
}
