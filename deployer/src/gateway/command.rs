//! Command description and the runner seam

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::DeployerError;

/// A single external command: program, argument vector and where to run it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, the runner's default when `None`
    pub cwd: Option<PathBuf>,
    /// Extra environment variables on top of the inherited environment
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Fully buffered output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands to completion
///
/// Implementations return [`DeployerError::CommandFailed`] or
/// [`DeployerError::CommandTimedOut`] with whatever output was captured.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_arguments() {
        let spec = CommandSpec::new("nomad").args(["job", "status", "-json"]);
        assert_eq!(spec.to_string(), "nomad job status -json");
    }

    #[test]
    fn test_builder_keeps_argument_vector() {
        let spec = CommandSpec::new("bash")
            .arg("deploy-nomad.sh")
            .arg("feature 1; rm")
            .current_dir("/srv/scripts")
            .env("NOMAD_ADDR", "http://127.0.0.1:4646");

        assert_eq!(spec.args, vec!["deploy-nomad.sh", "feature 1; rm"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/srv/scripts")));
        assert_eq!(spec.envs.len(), 1);
    }
}
