//! Scheduler job records to deployment records

use openapi_server::models::DeploymentRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::deploy::branch::branch_of;
use crate::errors::DeployerError;

/// The fields of a `nomad job status -json` entry this service reads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawJob {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Type")]
    pub job_type: String,

    #[serde(rename = "Priority", default)]
    pub priority: Option<i64>,
}

/// Parse the scheduler job listing.
///
/// The document must be a JSON array. Entries that do not look like a job are
/// logged and skipped so one bad record cannot hide the others.
pub fn parse_jobs(stdout: &str) -> Result<Vec<RawJob>, DeployerError> {
    let entries: Option<Vec<Value>> =
        serde_json::from_str(stdout).map_err(|e| DeployerError::UpstreamParse {
            source_name: "nomad job status".to_string(),
            message: e.to_string(),
        })?;

    let jobs = entries
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| match RawJob::deserialize(&entry) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!(position, "Skipping malformed scheduler job record: {}", e);
                None
            }
        })
        .collect();

    Ok(jobs)
}

/// Keep jobs named `app-<branch>`, in scheduler order
pub fn translate_jobs(jobs: Vec<RawJob>) -> Vec<DeploymentRecord> {
    jobs.into_iter()
        .filter_map(|job| {
            let branch = branch_of(&job.id)?.to_string();
            Some(DeploymentRecord {
                branch,
                id: job.id,
                status: job.status,
                job_type: job.job_type,
                priority: job.priority,
            })
        })
        .collect()
}
