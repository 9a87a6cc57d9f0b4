//! Server state

use std::sync::Arc;

use crate::deploy::DeploymentController;
use crate::routing::RouteSource;
use crate::vcs::GitRemote;

/// Static facts about this instance reported by /health
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub scripts_dir: String,
    pub port: u16,
}

/// Server state shared across handlers
pub struct ServerState {
    pub controller: Arc<DeploymentController>,
    pub branches: Arc<GitRemote>,
    pub routes: Arc<dyn RouteSource>,
    pub info: ServiceInfo,
}

impl ServerState {
    pub fn new(
        controller: Arc<DeploymentController>,
        branches: Arc<GitRemote>,
        routes: Arc<dyn RouteSource>,
        info: ServiceInfo,
    ) -> Self {
        Self {
            controller,
            branches,
            routes,
            info,
        }
    }
}
