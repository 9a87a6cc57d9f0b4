//! Branch deployment lifecycle controller
//!
//! A branch moves through `absent -> deploying -> running -> cleaning ->
//! absent`. Only the two transient phases are tracked here, and only while a
//! request is running the corresponding script. Everything else is read back
//! from the scheduler on demand.

use std::path::PathBuf;
use std::sync::Arc;

use openapi_server::models::DeploymentRecord;
use serde_json::Value;
use tracing::{error, info};

use crate::deploy::branch::{validate_job_id, BranchName};
use crate::deploy::inflight::{InFlight, Operation};
use crate::errors::DeployerError;
use crate::gateway::{CommandRunner, CommandSpec};
use crate::scheduler::{
    parse_jobs, resolve_allocation, translate_jobs, AllocationHandle, NomadCli, NomadOptions,
};

/// Deploy and cleanup script configuration
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Interpreter the scripts are handed to
    pub interpreter: String,

    /// Directory holding the scripts, also their working directory
    pub dir: PathBuf,

    /// Deploy script, relative to `dir`
    pub deploy_script: String,

    /// Cleanup script, relative to `dir`
    pub cleanup_script: String,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            interpreter: "bash".to_string(),
            dir: PathBuf::from("/srv/nomad-config"),
            deploy_script: "deploy-nomad.sh".to_string(),
            cleanup_script: "cleanup-nomad.sh".to_string(),
        }
    }
}

/// Captured output of a successful deploy or cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub branch: BranchName,
    pub output: String,
    pub warnings: String,
}

/// Live logs of a branch deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchLogs {
    pub branch: BranchName,
    pub allocation: AllocationHandle,
    pub logs: String,
}

/// Orchestrates deploy, cleanup and scheduler queries for branches
pub struct DeploymentController {
    runner: Arc<dyn CommandRunner>,
    nomad: NomadCli,
    scripts: ScriptOptions,
    inflight: InFlight,
}

impl DeploymentController {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        nomad_options: NomadOptions,
        scripts: ScriptOptions,
    ) -> Self {
        Self {
            nomad: NomadCli::new(runner.clone(), nomad_options),
            runner,
            scripts,
            inflight: InFlight::new(),
        }
    }

    pub fn scripts(&self) -> &ScriptOptions {
        &self.scripts
    }

    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    /// Validate `branch` and run the deploy script for it
    pub async fn deploy(&self, branch: &str) -> Result<ScriptOutcome, DeployerError> {
        let branch = BranchName::parse(branch)?;
        info!(branch = %branch, "Deploying branch via Nomad");
        self.run_script(branch, Operation::Deploying).await
    }

    /// Validate `branch` and run the cleanup script for it
    pub async fn cleanup(&self, branch: &str) -> Result<ScriptOutcome, DeployerError> {
        let branch = BranchName::parse(branch)?;
        info!(branch = %branch, "Cleaning up Nomad deployment");
        self.run_script(branch, Operation::Cleaning).await
    }

    /// Branch deployments known to the scheduler
    pub async fn list_jobs(&self) -> Result<Vec<DeploymentRecord>, DeployerError> {
        let stdout = self.nomad.job_status_all().await?;
        Ok(translate_jobs(parse_jobs(&stdout)?))
    }

    /// Raw scheduler document for one job
    pub async fn get_job(&self, id: &str) -> Result<Value, DeployerError> {
        let id = validate_job_id(id)?;
        let stdout = self.nomad.job_status(id).await?;
        serde_json::from_str(&stdout).map_err(|e| DeployerError::UpstreamParse {
            source_name: format!("nomad job status {}", id),
            message: e.to_string(),
        })
    }

    /// Logs of the allocation currently running `branch`
    pub async fn logs(&self, branch: &str) -> Result<BranchLogs, DeployerError> {
        let branch = BranchName::parse(branch)?;
        let allocation = resolve_allocation(&self.nomad, &branch).await?;
        let logs = self.nomad.alloc_logs(&allocation.allocation_id).await?;

        Ok(BranchLogs {
            branch,
            allocation,
            logs,
        })
    }

    async fn run_script(
        &self,
        branch: BranchName,
        operation: Operation,
    ) -> Result<ScriptOutcome, DeployerError> {
        let guard = self.inflight.acquire(&branch, operation)?;

        let script = match operation {
            Operation::Deploying => &self.scripts.deploy_script,
            Operation::Cleaning => &self.scripts.cleanup_script,
        };
        let spec = CommandSpec::new(&self.scripts.interpreter)
            .arg(script)
            .arg(branch.as_str())
            .current_dir(&self.scripts.dir);

        // The script keeps running, and keeps its claim on the branch, even
        // if the request that started it goes away.
        let runner = self.runner.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            runner.run(&spec).await
        });

        let result = task.await.map_err(|e| {
            DeployerError::Internal(format!("{} task for {} failed: {}", operation, branch, e))
        })?;

        match result {
            Ok(output) => {
                info!(branch = %branch, %operation, "Script finished successfully");
                Ok(ScriptOutcome {
                    branch,
                    output: output.stdout,
                    warnings: output.stderr,
                })
            }
            Err(e) => {
                error!(branch = %branch, %operation, "Script failed: {}", e);
                Err(e)
            }
        }
    }
}
