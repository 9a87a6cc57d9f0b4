//! Error types for the deployer

use std::time::Duration;

use thiserror::Error;

/// Why a branch identifier was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchError {
    #[error("Branch name is required")]
    Missing,

    #[error("Invalid branch name: {0:?}")]
    Invalid(String),
}

/// Main error type for the deployer
#[derive(Error, Debug)]
pub enum DeployerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error(transparent)]
    InvalidBranch(#[from] BranchError),

    #[error("Invalid job id: {0:?}")]
    InvalidJobId(String),

    #[error("No allocations found for job {0}")]
    NoAllocations(String),

    #[error("Branch {branch} is already {operation}")]
    Conflict { branch: String, operation: String },

    #[error("{message}")]
    CommandFailed {
        command: String,
        message: String,
        stdout: String,
        stderr: String,
    },

    #[error("Command timed out after {timeout:?}: {command}")]
    CommandTimedOut {
        command: String,
        timeout: Duration,
        stdout: String,
        stderr: String,
    },

    #[error("Unexpected output from {source_name}: {message}")]
    UpstreamParse { source_name: String, message: String },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployerError {
    /// Captured stdout of a failed or timed out command
    pub fn stdout(&self) -> Option<&str> {
        match self {
            DeployerError::CommandFailed { stdout, .. }
            | DeployerError::CommandTimedOut { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Captured stderr of a failed or timed out command
    pub fn stderr(&self) -> Option<&str> {
        match self {
            DeployerError::CommandFailed { stderr, .. }
            | DeployerError::CommandTimedOut { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
