//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::deploy::DeploymentController;
use crate::errors::DeployerError;
use crate::gateway::{CommandRunner, ProcessRunner};
use crate::routing::{CaddyClient, RouteSource};
use crate::server::serve::serve;
use crate::server::state::{ServerState, ServiceInfo};
use crate::vcs::GitRemote;

/// Run the deployment API until the shutdown signal fires
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeployerError> {
    info!("Initializing Nomad deployment API...");

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, &mut shutdown_manager, shutdown_tx.subscribe()).await {
        error!("Failed to start deployment API: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

/// Build the shared server state from the options
pub fn init_server_state(options: &AppOptions) -> Result<ServerState, DeployerError> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new(options.gateway.clone()));

    let controller = DeploymentController::new(
        runner.clone(),
        options.nomad.clone(),
        options.scripts.clone(),
    );
    let branches = GitRemote::new(runner, options.repository.clone());
    let routes: Arc<dyn RouteSource> =
        Arc::new(CaddyClient::new(&options.routes.url, options.routes.timeout)?);

    let info = ServiceInfo {
        scripts_dir: options.scripts.dir.display().to_string(),
        port: options.server.port,
    };

    Ok(ServerState::new(
        Arc::new(controller),
        Arc::new(branches),
        routes,
        info,
    ))
}

async fn init(
    options: &AppOptions,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DeployerError> {
    info!("Initializing HTTP server...");

    let server_state = init_server_state(options)?;

    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_server_handle(server_handle)?;
    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    server_handle: Option<JoinHandle<Result<(), DeployerError>>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            server_handle: None,
        }
    }

    pub fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), DeployerError>>,
    ) -> Result<(), DeployerError> {
        if self.server_handle.is_some() {
            return Err(DeployerError::ShutdownError("server_handle already set".to_string()));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), DeployerError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), DeployerError> {
        info!("Shutting down Nomad deployment API...");

        // In-flight requests drain through axum's graceful shutdown; a script
        // already spawned keeps running until the runtime exits.
        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| DeployerError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
