//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use deployer::deploy::{DeploymentController, ScriptOptions};
use deployer::errors::DeployerError;
use deployer::gateway::{CommandOutput, CommandRunner, CommandSpec};
use deployer::routing::RouteSource;
use deployer::scheduler::NomadOptions;
use deployer::server::state::{ServerState, ServiceInfo};
use deployer::vcs::{GitRemote, RepositoryOptions};

type Responder = dyn Fn(&CommandSpec) -> Result<CommandOutput, DeployerError> + Send + Sync;

/// Records every command and answers from a closure
pub struct SpyRunner {
    calls: Mutex<Vec<CommandSpec>>,
    respond: Box<Responder>,
    gate: Option<Arc<Notify>>,
}

impl SpyRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, DeployerError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            gate: None,
        }
    }

    /// Every command succeeds with the given stdout
    pub fn stdout(stdout: &str) -> Self {
        let stdout = stdout.to_string();
        Self::new(move |_| Ok(ok(&stdout)))
    }

    /// Commands wait for `gate` to be notified before answering
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for SpyRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployerError> {
        self.calls.lock().unwrap().push(spec.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.respond)(spec)
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(spec: &CommandSpec, stdout: &str, stderr: &str) -> DeployerError {
    DeployerError::CommandFailed {
        command: spec.to_string(),
        message: format!("Command failed: {} (exit status: 1)", spec),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Serves a fixed route document
pub struct StubRoutes {
    body: Result<String, String>,
}

impl StubRoutes {
    pub fn body(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
        }
    }

    pub fn unreachable(message: &str) -> Self {
        Self {
            body: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl RouteSource for StubRoutes {
    async fn fetch_routes(&self) -> Result<String, DeployerError> {
        self.body.clone().map_err(DeployerError::Upstream)
    }
}

pub fn script_options() -> ScriptOptions {
    ScriptOptions {
        dir: "/srv/nomad-config".into(),
        ..Default::default()
    }
}

pub fn controller(runner: Arc<SpyRunner>) -> DeploymentController {
    DeploymentController::new(runner, NomadOptions::default(), script_options())
}

pub fn server_state(runner: Arc<SpyRunner>, routes: StubRoutes) -> ServerState {
    let controller = controller(runner.clone());
    let branches = GitRemote::new(
        runner,
        RepositoryOptions {
            dir: "/srv/repos/app".into(),
            remote: "origin".to_string(),
        },
    );

    ServerState::new(
        Arc::new(controller),
        Arc::new(branches),
        Arc::new(routes),
        ServiceInfo {
            scripts_dir: "/srv/nomad-config".to_string(),
            port: 3000,
        },
    )
}
