//! Funcbridge core crate.
//!
//! Exposes a set of ordinary server-side functions as one remote-callable
//! HTTP endpoint, portable across host frameworks. Build an immutable
//! [`Registry`] of named functions, turn it into a [`Dispatcher`] with
//! [`modular`], and hand requests in through the [`HostAdapter`] for your
//! framework. Functions that need request metadata (host, headers, query)
//! register through [`context`] instead of taking a framework-specific
//! parameter.
//!
//! ```ignore
//! use funcbridge::{Registry, modular, run};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> funcbridge::Result<()> {
//!     let registry = Registry::builder()
//!         .typed("add", |(x, y): (f64, f64)| async move { Ok(json!(x + y)) })
//!         .build();
//!
//!     run(modular(registry)).await
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod serve;

pub use crate::adapter::HostAdapter;
pub use crate::adapter::axum::AxumAdapter;
pub use crate::adapter::http::HttpAdapter;
pub use crate::adapter::local::{LocalAdapter, LocalResponse};
pub use crate::config::{BridgeConfig, BridgeConfigBuilder};
pub use crate::context::RequestContext;
pub use crate::dispatch::{Dispatcher, modular};
pub use crate::error::{BridgeError, CallError, DispatchError, Result};
pub use crate::registry::{
    CallOutcome, Callable, ContextCapsule, Entry, Registry, RegistryBuilder, context,
};
pub use crate::serve::{router, run, serve};
pub use funcbridge_wire::{CallEnvelope, ErrorDetail, ErrorEnvelope};
