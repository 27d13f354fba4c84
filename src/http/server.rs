//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router with the redirect handler as its only route
//! - Wire up middleware (tracing, optional request timeout)
//! - Serve on a bound listener until the shutdown future resolves

use std::future::Future;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;

use super::handler::{redirect, AppState};

/// Build the router: every method and path goes to the redirect handler.
pub fn router(state: AppState, config: &Config) -> Router {
    let mut app = Router::new().fallback(redirect).with_state(state);

    if config.request_timeout_ms > 0 {
        app = app.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(config.request_timeout_ms),
        ));
    }

    app.layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating shutdown..."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
