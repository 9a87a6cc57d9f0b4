//! Caddy admin API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use crate::errors::DeployerError;

/// Route endpoint of the Caddy instance fronting the branch deployments
pub const DEFAULT_ROUTES_URL: &str = "http://127.0.0.1:2021/config/apps/http/servers/srv0/routes";

/// Source of the live route configuration document
#[async_trait]
pub trait RouteSource: Send + Sync + 'static {
    /// Raw JSON body of the route list
    async fn fetch_routes(&self) -> Result<String, DeployerError>;
}

/// Reads routes from the Caddy admin API
pub struct CaddyClient {
    client: Client,
    routes_url: Url,
}

impl CaddyClient {
    pub fn new(routes_url: &str, timeout: Duration) -> Result<Self, DeployerError> {
        let routes_url = Url::parse(routes_url).map_err(|e| {
            DeployerError::ConfigError(format!("Invalid route config URL {}: {}", routes_url, e))
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, routes_url })
    }

    pub fn routes_url(&self) -> &Url {
        &self.routes_url
    }
}

#[async_trait]
impl RouteSource for CaddyClient {
    async fn fetch_routes(&self) -> Result<String, DeployerError> {
        debug!("GET {}", self.routes_url);

        let response = self.client.get(self.routes_url.clone()).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Route config request failed: {} - {}", status, body);
            return Err(DeployerError::Upstream(format!("{}: {}", status, body)));
        }

        Ok(response.text().await?)
    }
}
