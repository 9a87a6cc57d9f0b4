//! Application configuration options

use std::time::Duration;

use crate::deploy::ScriptOptions;
use crate::gateway::ProcessRunnerOptions;
use crate::routing::caddy::DEFAULT_ROUTES_URL;
use crate::scheduler::NomadOptions;
use crate::settings::Settings;
use crate::vcs::RepositoryOptions;

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// External process gateway
    pub gateway: ProcessRunnerOptions,

    /// Nomad CLI
    pub nomad: NomadOptions,

    /// Deploy and cleanup scripts
    pub scripts: ScriptOptions,

    /// Repository the branch list comes from
    pub repository: RepositoryOptions,

    /// Caddy route source
    pub routes: RouteOptions,
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        let timeout = match settings.commands.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
                permissive_cors: settings.server.permissive_cors,
            },
            gateway: ProcessRunnerOptions {
                default_cwd: settings.scripts.dir.clone(),
                max_output_bytes: settings.commands.max_output_bytes,
                timeout,
            },
            nomad: NomadOptions {
                binary: settings.nomad.binary.clone(),
                address: settings.nomad.address.clone(),
            },
            scripts: ScriptOptions {
                interpreter: settings.scripts.interpreter.clone(),
                dir: settings.scripts.dir.clone(),
                deploy_script: settings.scripts.deploy.clone(),
                cleanup_script: settings.scripts.cleanup.clone(),
            },
            repository: RepositoryOptions {
                dir: settings.repository.dir.clone(),
                remote: settings.repository.remote.clone(),
            },
            routes: RouteOptions {
                url: settings.routes.config_url.clone(),
                timeout: Duration::from_secs(settings.routes.timeout_secs),
            },
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allow any origin
    pub permissive_cors: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            permissive_cors: true,
        }
    }
}

/// Caddy route source options
#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Admin API endpoint listing the server's routes
    pub url: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_ROUTES_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}
