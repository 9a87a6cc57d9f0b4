//! Branch identifiers and the job IDs derived from them

use std::fmt;

use crate::errors::{BranchError, DeployerError};

/// Prefix of every job this service manages
pub const JOB_PREFIX: &str = "app-";

/// A validated branch identifier.
///
/// Only `[A-Za-z0-9_-]+` is accepted. The value ends up as a process
/// argument, so anything else is rejected rather than escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    pub fn parse(input: &str) -> Result<Self, BranchError> {
        if input.is_empty() {
            return Err(BranchError::Missing);
        }
        if !input.chars().all(is_branch_char) {
            return Err(BranchError::Invalid(input.to_string()));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheduler job backing this branch
    pub fn job_id(&self) -> JobId {
        JobId(format!("{}{}", JOB_PREFIX, self.0))
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_branch_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Scheduler job ID of a branch deployment, always `app-<branch>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Branch part of the job ID
    pub fn branch(&self) -> &str {
        &self.0[JOB_PREFIX.len()..]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Branch encoded in a raw scheduler job ID, if it follows the naming scheme
pub fn branch_of(job_id: &str) -> Option<&str> {
    job_id.strip_prefix(JOB_PREFIX)
}

/// Check a job ID taken from a request path before it becomes an argument.
///
/// Any scheduler ID is allowed except an empty one or one that would be read
/// as a CLI flag.
pub fn validate_job_id(id: &str) -> Result<&str, DeployerError> {
    if id.is_empty() || id.starts_with('-') || id.chars().any(char::is_control) {
        return Err(DeployerError::InvalidJobId(id.to_string()));
    }
    Ok(id)
}
