//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use openapi_server::models::{
    BranchListResponse, DeployRequest, HealthResponse, JobListResponse, JobResponse,
    LogsResponse, OperationResponse, RouteListResponse, VersionResponse,
};

use crate::routing::list_routes;
use crate::server::error::ApiError;
use crate::server::state::ServerState;
use crate::utils::{timestamp_now, version_info};

/// Health check handler
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Nomad Deployment API is running".to_string(),
        timestamp: timestamp_now(),
        scripts_dir: state.info.scripts_dir.clone(),
        port: state.info.port,
        version: version_info().version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Branch deployments known to the scheduler
pub async fn jobs_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<JobListResponse>, ApiError> {
    let jobs = state
        .controller
        .list_jobs()
        .await
        .map_err(|e| ApiError::fetch("Failed to fetch Nomad jobs", e))?;

    Ok(Json(JobListResponse {
        success: true,
        jobs,
    }))
}

/// Raw scheduler status of one job
pub async fn job_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state
        .controller
        .get_job(&id)
        .await
        .map_err(|e| ApiError::fetch(format!("Failed to fetch job {}", id), e))?;

    Ok(Json(JobResponse { success: true, job }))
}

/// Branches of the application remote
pub async fn branches_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<BranchListResponse>, ApiError> {
    let branches = state
        .branches
        .list_branches()
        .await
        .map_err(|e| ApiError::with_output("Failed to fetch branches", e))?;

    Ok(Json(BranchListResponse {
        success: true,
        branches,
    }))
}

/// Live reverse proxy routes
pub async fn routes_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<RouteListResponse>, ApiError> {
    let routes = list_routes(state.routes.as_ref())
        .await
        .map_err(|e| ApiError::fetch("Failed to fetch routes", e))?;

    Ok(Json(RouteListResponse {
        success: true,
        routes,
    }))
}

/// Logs of the allocation running a branch
pub async fn logs_handler(
    State(state): State<Arc<ServerState>>,
    Path(branch): Path<String>,
) -> Result<Json<LogsResponse>, ApiError> {
    let logs = state
        .controller
        .logs(&branch)
        .await
        .map_err(|e| ApiError::fetch("Failed to fetch logs", e))?;

    Ok(Json(LogsResponse {
        success: true,
        branch: logs.branch.to_string(),
        alloc_id: logs.allocation.allocation_id,
        logs: logs.logs,
    }))
}

/// Deploy a branch
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request("Invalid request body").with_details(rejection.body_text())
    })?;
    let branch = request.branch.unwrap_or_default();

    let outcome = state
        .controller
        .deploy(&branch)
        .await
        .map_err(|e| ApiError::with_output(format!("Failed to deploy {} via Nomad", branch), e))?;

    Ok(Json(OperationResponse {
        success: true,
        message: format!("Successfully deployed {} via Nomad", outcome.branch),
        branch: outcome.branch.to_string(),
        output: outcome.output,
        warnings: outcome.warnings,
    }))
}

/// Tear down a branch deployment
pub async fn cleanup_handler(
    State(state): State<Arc<ServerState>>,
    Path(branch): Path<String>,
) -> Result<Json<OperationResponse>, ApiError> {
    let outcome = state
        .controller
        .cleanup(&branch)
        .await
        .map_err(|e| ApiError::with_output(format!("Failed to cleanup {}", branch), e))?;

    Ok(Json(OperationResponse {
        success: true,
        message: format!("Successfully cleaned up {}", outcome.branch),
        branch: outcome.branch.to_string(),
        output: outcome.output,
        warnings: outcome.warnings,
    }))
}
