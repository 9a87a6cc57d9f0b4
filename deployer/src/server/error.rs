//! Mapping of deployer errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openapi_server::models::ErrorResponse;

use crate::errors::{BranchError, DeployerError};

/// JSON failure response, `{success: false, error, details?, stderr?}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                error: error.into(),
                details: None,
                stderr: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    /// Failure of a read path; `details` carries the failure message
    pub fn fetch(context: impl Into<String>, err: DeployerError) -> Self {
        if let Some(client_error) = Self::client_error(&err) {
            return client_error;
        }
        Self::new(server_status(&err), context).with_details(err.to_string())
    }

    /// Failure of a command whose output matters to the caller.
    ///
    /// `details` prefers the captured stdout over the failure message and
    /// `stderr` is passed along.
    pub fn with_output(context: impl Into<String>, err: DeployerError) -> Self {
        if let Some(client_error) = Self::client_error(&err) {
            return client_error;
        }
        let details = match err.stdout() {
            Some(stdout) if !stdout.is_empty() => stdout.to_string(),
            _ => err.to_string(),
        };
        let mut api_error = Self::new(server_status(&err), context).with_details(details);
        api_error.body.stderr = Some(err.stderr().unwrap_or_default().to_string());
        api_error
    }

    fn client_error(err: &DeployerError) -> Option<Self> {
        let api_error = match err {
            DeployerError::InvalidBranch(BranchError::Missing) => {
                Self::bad_request("Branch name is required")
            }
            DeployerError::InvalidBranch(BranchError::Invalid(_)) => {
                Self::bad_request("Invalid branch name")
            }
            DeployerError::InvalidJobId(_) => Self::bad_request("Invalid job id"),
            DeployerError::NoAllocations(_) => {
                Self::new(StatusCode::NOT_FOUND, "No allocations found for this job")
            }
            DeployerError::Conflict { .. } => Self::new(StatusCode::CONFLICT, err.to_string()),
            _ => return None,
        };
        Some(api_error)
    }
}

fn server_status(err: &DeployerError) -> StatusCode {
    match err {
        DeployerError::CommandTimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn command_failed(stdout: &str, stderr: &str) -> DeployerError {
        DeployerError::CommandFailed {
            command: "bash cleanup-nomad.sh main".to_string(),
            message: "Command failed: bash cleanup-nomad.sh main (exit status: 1)".to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let missing = ApiError::with_output("ctx", BranchError::Missing.into());
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.body.error, "Branch name is required");
        assert!(missing.body.stderr.is_none());

        let invalid = ApiError::fetch("ctx", BranchError::Invalid("a;b".to_string()).into());
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.body.error, "Invalid branch name");
    }

    #[test]
    fn test_conflict_and_job_id_statuses() {
        let conflict = ApiError::with_output(
            "Failed to cleanup main",
            DeployerError::Conflict {
                branch: "main".to_string(),
                operation: "deploying".to_string(),
            },
        );
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.body.error, "Branch main is already deploying");
        assert!(conflict.body.stderr.is_none());

        let job_id = ApiError::fetch("ctx", DeployerError::InvalidJobId("-x".to_string()));
        assert_eq!(job_id.status, StatusCode::BAD_REQUEST);
        assert_eq!(job_id.body.error, "Invalid job id");
    }

    #[test]
    fn test_no_allocations_is_not_found() {
        let err = ApiError::fetch("ctx", DeployerError::NoAllocations("app-x".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.body.details.is_none());
    }

    #[test]
    fn test_output_prefers_stdout() {
        let err = ApiError::with_output("Failed to cleanup main", command_failed("step 1 ok\n", "boom\n"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.details.as_deref(), Some("step 1 ok\n"));
        assert_eq!(err.body.stderr.as_deref(), Some("boom\n"));
        assert!(!err.body.success);
    }

    #[test]
    fn test_output_falls_back_to_message() {
        let err = ApiError::with_output("Failed to cleanup main", command_failed("", "boom\n"));
        assert_eq!(
            err.body.details.as_deref(),
            Some("Command failed: bash cleanup-nomad.sh main (exit status: 1)")
        );
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        let err = ApiError::with_output(
            "Failed to deploy main via Nomad",
            DeployerError::CommandTimedOut {
                command: "bash deploy-nomad.sh main".to_string(),
                timeout: Duration::from_secs(600),
                stdout: String::new(),
                stderr: "waiting for allocation\n".to_string(),
            },
        );
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.body.stderr.as_deref(), Some("waiting for allocation\n"));
    }

    #[test]
    fn test_fetch_uses_message() {
        let err = ApiError::fetch(
            "Failed to fetch Nomad jobs",
            DeployerError::UpstreamParse {
                source_name: "nomad job status".to_string(),
                message: "expected value at line 1 column 1".to_string(),
            },
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to fetch Nomad jobs");
        assert!(err.body.details.unwrap().contains("expected value"));
    }
}
