//! Nomad CLI wrapper

use std::sync::Arc;

use tracing::debug;

use crate::errors::DeployerError;
use crate::gateway::{CommandRunner, CommandSpec};

/// Nomad CLI options
#[derive(Debug, Clone)]
pub struct NomadOptions {
    /// Path or name of the nomad binary
    pub binary: String,

    /// Passed as NOMAD_ADDR when set, otherwise the inherited environment wins
    pub address: Option<String>,
}

impl Default for NomadOptions {
    fn default() -> Self {
        Self {
            binary: "nomad".to_string(),
            address: None,
        }
    }
}

/// Thin wrapper building nomad commands for the gateway
pub struct NomadCli {
    runner: Arc<dyn CommandRunner>,
    options: NomadOptions,
}

impl NomadCli {
    pub fn new(runner: Arc<dyn CommandRunner>, options: NomadOptions) -> Self {
        Self { runner, options }
    }

    /// `nomad job status -json`
    pub async fn job_status_all(&self) -> Result<String, DeployerError> {
        self.run(["job", "status", "-json"]).await
    }

    /// `nomad job status -json <id>`
    pub async fn job_status(&self, id: &str) -> Result<String, DeployerError> {
        self.run(["job", "status", "-json", id]).await
    }

    /// `nomad job allocs <job>`
    pub async fn job_allocs(&self, job: &str) -> Result<String, DeployerError> {
        self.run(["job", "allocs", job]).await
    }

    /// `nomad alloc logs <alloc>`
    pub async fn alloc_logs(&self, alloc_id: &str) -> Result<String, DeployerError> {
        self.run(["alloc", "logs", alloc_id]).await
    }

    async fn run<const N: usize>(&self, args: [&str; N]) -> Result<String, DeployerError> {
        let mut spec = CommandSpec::new(&self.options.binary).args(args);
        if let Some(address) = &self.options.address {
            spec = spec.env("NOMAD_ADDR", address);
        }
        debug!("Querying scheduler: {}", spec);
        let output = self.runner.run(&spec).await?;
        Ok(output.stdout)
    }
}
