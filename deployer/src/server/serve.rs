//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::DeployerError;
use crate::server::handlers::{
    branches_handler, cleanup_handler, deploy_handler, health_handler, job_handler,
    jobs_handler, logs_handler, routes_handler, version_handler,
};
use crate::server::state::ServerState;

/// Build the API router
pub fn router(state: Arc<ServerState>, permissive_cors: bool) -> Router {
    let app = Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Scheduler
        .route("/nomad/jobs", get(jobs_handler))
        .route("/nomad/job/{id}", get(job_handler))
        // Enumerators
        .route("/branches", get(branches_handler))
        .route("/routes", get(routes_handler))
        // Branch lifecycle
        .route("/logs/{branch}", get(logs_handler))
        .route("/deploy", post(deploy_handler))
        .route("/cleanup/{branch}", delete(cleanup_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), DeployerError>>, DeployerError> {
    let app = router(state, options.permissive_cors);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DeployerError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| DeployerError::ServerError(e.to_string()))
    });

    Ok(handle)
}
