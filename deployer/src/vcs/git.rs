//! Remote branch listing for the application checkout

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::DeployerError;
use crate::gateway::{CommandRunner, CommandSpec};

/// Repository checkout options
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Local checkout the branches are listed from
    pub dir: PathBuf,

    /// Remote to refresh and list
    pub remote: String,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/srv/repos/app"),
            remote: "origin".to_string(),
        }
    }
}

/// Lists deployable branches of a remote
pub struct GitRemote {
    runner: Arc<dyn CommandRunner>,
    options: RepositoryOptions,
}

impl GitRemote {
    pub fn new(runner: Arc<dyn CommandRunner>, options: RepositoryOptions) -> Self {
        Self { runner, options }
    }

    /// Refresh the remote, then list its branches.
    ///
    /// Names are returned as git prints them; they are advisory and are not
    /// validated as branch identifiers.
    pub async fn list_branches(&self) -> Result<Vec<String>, DeployerError> {
        debug!(
            "Fetching {} in {}",
            self.options.remote,
            self.options.dir.display()
        );
        self.runner
            .run(&self.git(["fetch", self.options.remote.as_str()]))
            .await?;

        let output = self.runner.run(&self.git(["branch", "-r"])).await?;
        Ok(parse_remote_branches(&output.stdout, &self.options.remote))
    }

    fn git<const N: usize>(&self, args: [&str; N]) -> CommandSpec {
        CommandSpec::new("git")
            .args(args)
            .current_dir(&self.options.dir)
    }
}

/// Parse `git branch -r` output into bare branch names
pub fn parse_remote_branches(stdout: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{}/", remote);
    stdout
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix(&prefix).unwrap_or(line))
        .filter(|name| !name.is_empty() && !is_head_pointer(name))
        .map(str::to_string)
        .collect()
}

fn is_head_pointer(name: &str) -> bool {
    name == "HEAD" || name.starts_with("HEAD ->")
}
