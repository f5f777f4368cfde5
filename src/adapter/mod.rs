//! The host-framework adapter contract.
//!
//! Every supported host integrates through one implementation of
//! [`HostAdapter`]: a per-request shim that translates the framework's native
//! request/response objects into the small capability set the dispatcher
//! needs. Adapters do shape conversion only; resolution, argument
//! marshalling, and error containment all live in the dispatcher, which is
//! how new hosts get added without touching it.
//!
//! Shipped implementations:
//! - [`AxumAdapter`](axum::AxumAdapter) for axum services,
//! - [`HttpAdapter`](http::HttpAdapter) for hosts that hand over plain
//!   `http` requests with a buffered body (hyper, tower, and friends),
//! - [`LocalAdapter`](local::LocalAdapter) for tests and embedded callers.
//!
//! Unsupported hosts implement the trait themselves; one adapter instance is
//! built per inbound request and consumed when the response is produced.

pub mod axum;
pub mod http;
pub mod local;

use ::axum::http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::DispatchError;

/// Capability set a host framework must provide for one request.
pub trait HostAdapter: Send + Sync {
    /// Native response type of the host framework.
    type Response;

    /// HTTP method of the inbound request.
    fn method(&self) -> &Method;

    /// Raw request body bytes, or `None` when the host supplied none.
    fn raw_body(&self) -> Option<&[u8]>;

    /// Parsed JSON request payload.
    ///
    /// The default implementation decodes [`raw_body`](Self::raw_body) here;
    /// adapters whose host middleware already decoded the payload can
    /// override it. An absent or empty body is `Ok(None)`, a present but
    /// invalid body is a [`DispatchError::MalformedPayload`].
    fn body(&self) -> Result<Option<Value>, DispatchError> {
        match self.raw_body() {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => serde_json::from_slice(raw)
                .map(Some)
                .map_err(|err| DispatchError::MalformedPayload(format!(
                    "request body is not valid JSON: {err}"
                ))),
        }
    }

    /// Request metadata handed to context projections.
    ///
    /// The dispatcher passes it through without interpreting it.
    fn raw_context(&self) -> &RequestContext;

    /// Writes a successful return value as the host's native response.
    fn send_result(self, value: &Value) -> Self::Response;

    /// Writes a dispatch failure as the host's native response, using the
    /// error's status and wire envelope.
    fn send_error(self, error: &DispatchError) -> Self::Response;
}

// Serializing tree-shaped JSON to a string cannot fail; the fallback only
// guards the type signature.
pub(crate) fn encode_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_owned())
}
