use axum::Router;
use axum::extract::State;
use axum::response::Response;
use axum::routing::any;
use tokio::net::TcpListener;

use crate::adapter::axum::AxumAdapter;
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;

/// Builds an axum router exposing the dispatcher at `path`.
///
/// Any HTTP method routed to the path reaches the dispatcher; restricting
/// methods is left to the host integration.
pub fn router(dispatcher: Dispatcher, path: &str) -> Router {
    Router::new()
        .route(path, any(handle_call))
        .with_state(dispatcher)
}

async fn handle_call(State(dispatcher): State<Dispatcher>, adapter: AxumAdapter) -> Response {
    dispatcher.dispatch(adapter).await
}

/// Serves the dispatcher with the provided configuration.
pub async fn serve(dispatcher: Dispatcher, config: BridgeConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        path = %config.path,
        functions = dispatcher.registry().len(),
        "funcbridge listening"
    );

    let router = router(dispatcher, &config.path);
    let service = router.into_make_service();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .await?;

    Ok(())
}

/// Loads [`BridgeConfig`] from the environment and starts serving.
pub async fn run(dispatcher: Dispatcher) -> Result<()> {
    let config = BridgeConfig::from_env()?;
    serve(dispatcher, config).await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
