//! Settings file management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::DeployerError;
use crate::gateway::process::DEFAULT_MAX_OUTPUT_BYTES;
use crate::logs::LogLevel;
use crate::routing::caddy::DEFAULT_ROUTES_URL;

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/nomad-deployer/settings.json";

/// Deployer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON formatted logs
    #[serde(default)]
    pub log_json: bool,

    /// Also write daily rotated log files here
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// HTTP listener
    #[serde(default)]
    pub server: ServerSettings,

    /// Deploy and cleanup scripts
    #[serde(default)]
    pub scripts: ScriptSettings,

    /// Application repository checkout
    #[serde(default)]
    pub repository: RepositorySettings,

    /// Nomad CLI
    #[serde(default)]
    pub nomad: NomadSettings,

    /// Caddy admin API
    #[serde(default)]
    pub routes: RouteSettings,

    /// External command limits
    #[serde(default)]
    pub commands: CommandSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_dir: None,
            server: ServerSettings::default(),
            scripts: ScriptSettings::default(),
            repository: RepositorySettings::default(),
            nomad: NomadSettings::default(),
            routes: RouteSettings::default(),
            commands: CommandSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self, DeployerError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let settings = serde_json::from_str(&contents).map_err(|e| {
            DeployerError::ConfigError(format!("Invalid settings file {}: {}", path.display(), e))
        })?;
        Ok(settings)
    }

    /// Read settings from `path`, `None` when there is no file there
    pub async fn load_optional(path: &Path) -> Result<Option<Self>, DeployerError> {
        match tokio::fs::try_exists(path).await? {
            true => Self::load(path).await.map(Some),
            false => Ok(None),
        }
    }

    /// Read the file passed on the command line, which must exist, or else the
    /// default file if there is one.
    ///
    /// The flag is `false` when no file was read and defaults are in use.
    pub async fn load_configured(config: Option<&Path>) -> Result<(Self, bool), DeployerError> {
        if let Some(path) = config {
            return Ok((Self::load(path).await?, true));
        }
        match Self::load_optional(Path::new(DEFAULT_SETTINGS_PATH)).await? {
            Some(settings) => Ok((settings, true)),
            None => Ok((Self::default(), false)),
        }
    }

    /// Apply `PORT`, `SCRIPTS_DIR`, `REPO_DIR` and `NOMAD_ADDR` overrides
    pub fn apply_env(&mut self) -> Result<(), DeployerError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), DeployerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| DeployerError::ConfigError(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(dir) = lookup("SCRIPTS_DIR") {
            self.scripts.dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("REPO_DIR") {
            self.repository.dir = PathBuf::from(dir);
        }
        if let Some(address) = lookup("NOMAD_ADDR") {
            self.nomad.address = Some(address);
        }
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), DeployerError> {
        self.routes.url()?;
        if self.commands.max_output_bytes == 0 {
            return Err(DeployerError::ConfigError(
                "commands.max_output_bytes must be greater than zero".to_string(),
            ));
        }
        if self.scripts.interpreter.is_empty() {
            return Err(DeployerError::ConfigError(
                "scripts.interpreter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            permissive_cors: true,
        }
    }
}

/// Script settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSettings {
    #[serde(default = "default_scripts_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_deploy_script")]
    pub deploy: String,

    #[serde(default = "default_cleanup_script")]
    pub cleanup: String,
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("/srv/nomad-config")
}

fn default_interpreter() -> String {
    "bash".to_string()
}

fn default_deploy_script() -> String {
    "deploy-nomad.sh".to_string()
}

fn default_cleanup_script() -> String {
    "cleanup-nomad.sh".to_string()
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            dir: default_scripts_dir(),
            interpreter: default_interpreter(),
            deploy: default_deploy_script(),
            cleanup: default_cleanup_script(),
        }
    }
}

/// Repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(default = "default_repo_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from("/srv/repos/app")
}

fn default_remote() -> String {
    "origin".to_string()
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            dir: default_repo_dir(),
            remote: default_remote(),
        }
    }
}

/// Nomad settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomadSettings {
    #[serde(default = "default_nomad_binary")]
    pub binary: String,

    #[serde(default)]
    pub address: Option<String>,
}

fn default_nomad_binary() -> String {
    "nomad".to_string()
}

impl Default for NomadSettings {
    fn default() -> Self {
        Self {
            binary: default_nomad_binary(),
            address: None,
        }
    }
}

/// Caddy route settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default = "default_routes_url")]
    pub config_url: String,

    #[serde(default = "default_routes_timeout")]
    pub timeout_secs: u64,
}

fn default_routes_url() -> String {
    DEFAULT_ROUTES_URL.to_string()
}

fn default_routes_timeout() -> u64 {
    10
}

impl RouteSettings {
    pub fn url(&self) -> Result<Url, DeployerError> {
        Url::parse(&self.config_url).map_err(|e| {
            DeployerError::ConfigError(format!("Invalid routes.config_url {}: {}", self.config_url, e))
        })
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            config_url: default_routes_url(),
            timeout_secs: default_routes_timeout(),
        }
    }
}

/// External command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Per-stream capture limit
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Deadline per command, 0 disables it
    #[serde(default = "default_command_timeout")]
    pub timeout_secs: u64,
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

fn default_command_timeout() -> u64 {
    600
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            max_output_bytes: default_max_output_bytes(),
            timeout_secs: default_command_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.scripts.deploy, "deploy-nomad.sh");
        assert_eq!(settings.commands.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.routes.config_url, DEFAULT_ROUTES_URL);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let settings: Settings = serde_json::from_str(
            r#"{"log_level": "debug", "scripts": {"dir": "/opt/scripts"}, "commands": {"timeout_secs": 0}}"#,
        )
        .unwrap();

        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.scripts.dir, PathBuf::from("/opt/scripts"));
        assert_eq!(settings.scripts.interpreter, "bash");
        assert_eq!(settings.commands.timeout_secs, 0);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8081"),
            ("SCRIPTS_DIR", "/tmp/scripts"),
            ("NOMAD_ADDR", "http://nomad:4646"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.scripts.dir, PathBuf::from("/tmp/scripts"));
        assert_eq!(settings.repository.dir, PathBuf::from("/srv/repos/app"));
        assert_eq!(settings.nomad.address.as_deref(), Some("http://nomad:4646"));
    }

    #[test]
    fn test_invalid_port_override() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(DeployerError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let path = Path::new("/nonexistent/nomad-deployer/settings.json");

        assert!(Settings::load_optional(path).await.unwrap().is_none());
        assert!(matches!(
            Settings::load(path).await,
            Err(DeployerError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_explicit_config_must_exist() {
        let path = Path::new("/nonexistent/nomad-deployer/custom.json");

        let result = Settings::load_configured(Some(path)).await;
        assert!(matches!(result, Err(DeployerError::IoError(_))));
    }

    #[tokio::test]
    async fn test_load_optional_reads_existing_file() {
        let path = std::env::temp_dir().join(format!("deployer-settings-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"server": {"port": 4100}}"#).await.unwrap();

        let settings = Settings::load_optional(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(settings.unwrap().server.port, 4100);
    }

    #[test]
    fn test_invalid_routes_url() {
        let mut settings = Settings::default();
        settings.routes.config_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }
}
