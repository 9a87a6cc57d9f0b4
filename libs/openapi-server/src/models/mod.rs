//! Deployment API models

use serde::{Deserialize, Serialize};

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub scripts_dir: String,
    pub port: u16,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// A branch deployment as seen through the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub branch: String,
    pub status: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Job list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<DeploymentRecord>,
}

/// Single job response, the scheduler document is passed through as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: serde_json::Value,
}

/// Branch list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchListResponse {
    pub success: bool,
    pub branches: Vec<String>,
}

/// One route of the reverse proxy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub index: usize,
    pub path: String,
    pub upstream: String,
    #[serde(rename = "type")]
    pub handler_type: String,
    pub strip_prefix: Option<String>,
}

/// Route list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteListResponse {
    pub success: bool,
    pub routes: Vec<RouteDescriptor>,
}

/// Allocation logs response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub success: bool,
    pub branch: String,
    pub alloc_id: String,
    pub logs: String,
}

/// Deploy request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployRequest {
    #[serde(default)]
    pub branch: Option<String>,
}

/// Result of a deploy or cleanup script run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
    pub branch: String,
    pub output: String,
    pub warnings: String,
}

/// Failure envelope shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}
