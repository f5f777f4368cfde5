//! The dispatch core: one request in, one invocation, one response out.

use funcbridge_wire::CallEnvelope;
use serde_json::Value;

use crate::adapter::HostAdapter;
use crate::error::DispatchError;
use crate::registry::{Entry, Registry};

/// Builds the remote-callable surface over a finished registry.
///
/// The returned [`Dispatcher`] is the single entry point the host glue
/// feeds requests into; see [`Dispatcher::dispatch`]. Calling `modular`
/// repeatedly over one registry yields independent dispatchers that share
/// only the read-only entries.
pub fn modular(registry: Registry) -> Dispatcher {
    Dispatcher::new(registry)
}

/// Resolves, invokes, and responds to one call per request.
///
/// Holds no mutable state, so concurrent dispatches never contend: the only
/// shared object is the immutable [`Registry`]. Cloning is cheap and shares
/// the entries.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles one inbound request through its adapter.
    ///
    /// Every outcome, success or failure, is marshalled into exactly one
    /// native response; no error escapes to the host framework's own error
    /// path. The adapter is consumed when the response is produced.
    pub async fn dispatch<A: HostAdapter>(&self, adapter: A) -> A::Response {
        match self.evaluate(&adapter).await {
            Ok(value) => adapter.send_result(&value),
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "call failed");
                adapter.send_error(&err)
            }
        }
    }

    /// Received → Resolving → Invoking → {Succeeded | Failed}.
    async fn evaluate<A: HostAdapter>(&self, adapter: &A) -> Result<Value, DispatchError> {
        // Single-function shorthand: with exactly one entry the envelope's
        // name is irrelevant, so the body is only parsed for its args (and
        // capsule entries never parse it at all).
        let (name, entry, envelope) = match self.registry.sole() {
            Some((name, entry)) => (name.to_owned(), entry, None),
            None => {
                let envelope = read_envelope(adapter)?.unwrap_or_default();
                let name = envelope.name.clone().ok_or_else(DispatchError::unnamed)?;
                let entry = self
                    .registry
                    .get(&name)
                    .ok_or_else(|| DispatchError::unknown(&name))?;
                (name, entry, Some(envelope))
            }
        };

        tracing::debug!(method = %adapter.method(), function = %name, "dispatching call");

        let outcome = match entry {
            Entry::Function(callable) => {
                let args = match envelope {
                    Some(envelope) => envelope.into_args(),
                    None => read_envelope(adapter)?
                        .map(CallEnvelope::into_args)
                        .unwrap_or_default(),
                };
                callable.call(args).await
            }
            Entry::Context(capsule) => {
                let projected = (capsule.project)(adapter.raw_context())
                    .map_err(|err| DispatchError::CallFailure(err.to_string()))?;
                capsule.handler.call(spread(projected)).await
            }
        };

        outcome.map_err(|err| DispatchError::CallFailure(err.to_string()))
    }
}

/// An array projection becomes the positional argument list; anything else
/// is passed as the sole argument.
fn spread(projected: Value) -> Vec<Value> {
    match projected {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn read_envelope<A: HostAdapter>(adapter: &A) -> Result<Option<CallEnvelope>, DispatchError> {
    match adapter.body()? {
        None => Ok(None),
        Some(value) => CallEnvelope::from_value(value)
            .map(Some)
            .map_err(DispatchError::from),
    }
}
