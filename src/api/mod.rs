//! REST API server module
//!
//! Exposes the harvester over HTTP so a batch can be triggered by any client
//! that can POST a URL. All routes live under `/api/v1`.

use crate::{Config, DocHarvester, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Prefix shared by every route
pub const API_PREFIX: &str = "/api/v1";

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /api/v1/harvest` - Harvest the documents linked from a page
/// - `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
pub fn create_router(harvester: Arc<DocHarvester>, config: Arc<Config>) -> Router {
    let state = AppState::new(harvester);

    let api = Router::new()
        .route("/harvest", post(routes::harvest))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state);

    let router = Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list, or an empty list, allows any origin. Entries
/// that are not valid header values are ignored.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Runs until the server fails; see [`serve_until_signal`] for a server that
/// stops on SIGINT/SIGTERM.
///
/// # Example
///
/// ```no_run
/// use doc_harvester::{Config, DocHarvester};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default().with_env_overrides()?);
/// let harvester = Arc::new(DocHarvester::new((*config).clone())?);
///
/// doc_harvester::api::start_api_server(harvester, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(harvester: Arc<DocHarvester>, config: Arc<Config>) -> Result<()> {
    serve(harvester, config, std::future::pending()).await
}

/// Serve the API until the process receives SIGINT or SIGTERM
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve_until_signal(harvester: Arc<DocHarvester>, config: Arc<Config>) -> Result<()> {
    serve(harvester, config, wait_for_signal()).await
}

async fn serve(
    harvester: Arc<DocHarvester>,
    config: Arc<Config>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(harvester, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register unix signal handlers, using ctrl_c");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C signal");
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
