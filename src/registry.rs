//! Function registry and the `context(...)` primitive.
//!
//! A [`Registry`] is the immutable name-to-callable map behind one deployed
//! handler. Entries are either plain functions, invoked with the positional
//! arguments from the call envelope, or context capsules built with
//! [`context`], whose arguments are projected out of the request metadata
//! instead.
//!
//! # Example
//!
//! ```ignore
//! use funcbridge::{Registry, context};
//! use serde_json::{Value, json};
//!
//! let registry = Registry::builder()
//!     .typed("add", |(x, y): (f64, f64)| async move { Ok(json!(x + y)) })
//!     .entry(
//!         "whoami",
//!         context(
//!             |ctx| Ok(json!([ctx.host])),
//!             |args: Vec<Value>| async move {
//!                 Ok(args.into_iter().next().unwrap_or(Value::Null))
//!             },
//!         ),
//!     )
//!     .build();
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::CallError;

/// Boxed future for call outcomes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a registered function produces: a JSON value or a contained failure.
pub type CallOutcome = std::result::Result<Value, CallError>;

/// Result of a context projection.
pub type Projected = std::result::Result<Value, CallError>;

/// Object-safe callable invoked by the dispatcher with positional arguments.
pub trait Callable: Send + Sync + 'static {
    fn call(&self, args: Vec<Value>) -> BoxFuture<'static, CallOutcome>;
}

/// Wrapper turning a plain closure over positional arguments into a
/// [`Callable`].
pub struct FnCallable<F, Fut>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    handler: F,
}

impl<F, Fut> FnCallable<F, Fut>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, Fut> Callable for FnCallable<F, Fut>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    fn call(&self, args: Vec<Value>) -> BoxFuture<'static, CallOutcome> {
        Box::pin((self.handler)(args))
    }
}

/// Wrapper that decodes the positional argument array into `T` before calling.
///
/// `T` is usually a tuple, so `("add", |(x, y): (f64, f64)| ...)` receives a
/// two-element `args`. A decode mismatch is reported as a call failure.
pub struct TypedFunction<F, T, Fut>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(T) -> Fut>,
}

impl<F, T, Fut> TypedFunction<F, T, Fut>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, Fut> Callable for TypedFunction<F, T, Fut>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    fn call(&self, args: Vec<Value>) -> BoxFuture<'static, CallOutcome> {
        let parsed: T = match serde_json::from_value(Value::Array(args)) {
            Ok(value) => value,
            Err(err) => {
                let err: CallError = Box::new(err);
                return Box::pin(async move { Err(err) });
            }
        };

        Box::pin((self.handler)(parsed))
    }
}

/// Pure mapping from request metadata to the wrapped call's arguments.
pub type Projection = Box<dyn Fn(&RequestContext) -> Projected + Send + Sync>;

/// Registry entry tagged to receive projected request metadata as arguments.
pub struct ContextCapsule {
    pub(crate) project: Projection,
    pub(crate) handler: Box<dyn Callable>,
}

/// One registered callable: a plain function or a context capsule.
pub enum Entry {
    Function(Box<dyn Callable>),
    Context(ContextCapsule),
}

/// Marks a function as context-aware.
///
/// `project` runs once per call against the adapter's request metadata; when
/// it returns an array, the elements become the positional argument list for
/// `handler`, and any other value becomes the sole argument. Explicit `args`
/// in the call envelope are ignored for capsule entries.
///
/// A failing projection is reported exactly like a failing handler (a call
/// failure with a 5xx status). The source protocol leaves that case open, so
/// treat the mapping as an implementation decision rather than a contract.
pub fn context<P, H, Fut>(project: P, handler: H) -> Entry
where
    P: Fn(&RequestContext) -> Projected + Send + Sync + 'static,
    H: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    Entry::Context(ContextCapsule {
        project: Box::new(project),
        handler: Box::new(FnCallable::new(handler)),
    })
}

/// Immutable mapping from function name to callable for one deployed handler.
///
/// Built once via [`RegistryBuilder`] and never mutated afterwards. Cloning
/// is cheap and shares the underlying entries, which is safe for concurrent
/// readers precisely because nothing can write after `build()`.
#[derive(Clone)]
pub struct Registry {
    entries: Arc<HashMap<String, Entry>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all registered functions, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// The implicit target when exactly one function is registered.
    pub(crate) fn sole(&self) -> Option<(&str, &Entry)> {
        if self.entries.len() == 1 {
            self.entries
                .iter()
                .next()
                .map(|(name, entry)| (name.as_str(), entry))
        } else {
            None
        }
    }
}

/// Builder collecting named entries before freezing them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Entry>,
}

impl RegistryBuilder {
    /// Registers a plain function taking the envelope's positional arguments.
    pub fn function<F, Fut>(self, name: &str, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallOutcome> + Send + 'static,
    {
        self.entry(name, Entry::Function(Box::new(FnCallable::new(handler))))
    }

    /// Registers a function whose arguments decode into `T` (usually a tuple).
    pub fn typed<F, T, Fut>(self, name: &str, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        Fut: Future<Output = CallOutcome> + Send + 'static,
    {
        self.entry(name, Entry::Function(Box::new(TypedFunction::new(handler))))
    }

    /// Registers a context capsule; see [`context`].
    pub fn context<P, H, Fut>(self, name: &str, project: P, handler: H) -> Self
    where
        P: Fn(&RequestContext) -> Projected + Send + Sync + 'static,
        H: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallOutcome> + Send + 'static,
    {
        self.entry(name, context(project, handler))
    }

    /// Registers a prebuilt entry under `name`.
    ///
    /// Names are unique within one registry; a repeated name replaces the
    /// earlier entry and logs a warning.
    pub fn entry(mut self, name: &str, entry: Entry) -> Self {
        if self.entries.insert(name.to_owned(), entry).is_some() {
            tracing::warn!(function = name, "replacing existing registration");
        }
        self
    }

    /// Freezes the collected entries into an immutable registry.
    pub fn build(self) -> Registry {
        if self.entries.is_empty() {
            tracing::warn!("registry built with no functions; every call will fail");
        }

        Registry {
            entries: Arc::new(self.entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn plain_function_receives_positional_args() {
        let registry = Registry::builder()
            .function("first", |args: Vec<Value>| async move {
                Ok(args.into_iter().next().unwrap_or(Value::Null))
            })
            .build();

        let Entry::Function(callable) = registry.get("first").unwrap() else {
            panic!("expected a plain function");
        };
        let out = callable.call(vec![json!("a"), json!("b")]).await.unwrap();
        assert_eq!(out, json!("a"));
    }

    #[tokio::test]
    async fn typed_function_decodes_tuple() {
        let registry = Registry::builder()
            .typed("add", |(x, y): (i64, i64)| async move { Ok(json!(x + y)) })
            .build();

        let Entry::Function(callable) = registry.get("add").unwrap() else {
            panic!("expected a plain function");
        };
        let out = callable.call(vec![json!(2), json!(3)]).await.unwrap();
        assert_eq!(out, json!(5));
    }

    #[tokio::test]
    async fn typed_decode_mismatch_is_a_call_error() {
        let registry = Registry::builder()
            .typed("add", |(x, y): (i64, i64)| async move { Ok(json!(x + y)) })
            .build();

        let Entry::Function(callable) = registry.get("add").unwrap() else {
            panic!("expected a plain function");
        };
        let err = callable
            .call(vec![json!("two"), json!(3)])
            .await
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn sole_entry_only_for_singleton_registries() {
        let one = Registry::builder()
            .function("only", |_args: Vec<Value>| async { Ok(Value::Null) })
            .build();
        assert_eq!(one.sole().map(|(name, _)| name), Some("only"));

        let two = Registry::builder()
            .function("a", |_args: Vec<Value>| async { Ok(Value::Null) })
            .function("b", |_args: Vec<Value>| async { Ok(Value::Null) })
            .build();
        assert!(two.sole().is_none());
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn duplicate_name_replaces_entry() {
        let registry = Registry::builder()
            .function("dup", |_args: Vec<Value>| async { Ok(json!(1)) })
            .function("dup", |_args: Vec<Value>| async { Ok(json!(2)) })
            .build();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let registry = Registry::builder()
            .function("only", |_args: Vec<Value>| async { Ok(Value::Null) })
            .build();
        let clone = registry.clone();
        assert_eq!(clone.len(), registry.len());
        assert!(clone.names().eq(registry.names()));
    }
}
