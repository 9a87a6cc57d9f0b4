//! Projection of Caddy routes into route descriptors

use openapi_server::models::RouteDescriptor;
use serde_json::Value;

use crate::errors::DeployerError;
use crate::routing::caddy::RouteSource;

/// Placeholder for a route field the configuration does not set
pub const NOT_APPLICABLE: &str = "N/A";

const DEFAULT_HANDLER: &str = "reverse_proxy";

/// Fetch and project the current route list
pub async fn list_routes(source: &dyn RouteSource) -> Result<Vec<RouteDescriptor>, DeployerError> {
    let body = source.fetch_routes().await?;
    project_routes(&body)
}

/// Project a Caddy route list document.
///
/// `null` is an empty list. A route missing any of the looked-up fields gets
/// a placeholder for that field instead of failing the listing.
pub fn project_routes(body: &str) -> Result<Vec<RouteDescriptor>, DeployerError> {
    let routes: Option<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| DeployerError::UpstreamParse {
            source_name: "caddy routes".to_string(),
            message: e.to_string(),
        })?;

    Ok(routes
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, route)| describe(index, route))
        .collect())
}

fn describe(index: usize, route: &Value) -> RouteDescriptor {
    RouteDescriptor {
        index,
        path: text_at(route, "/match/0/path/0").unwrap_or(NOT_APPLICABLE).to_string(),
        upstream: text_at(route, "/handle/0/upstreams/0/dial")
            .unwrap_or(NOT_APPLICABLE)
            .to_string(),
        handler_type: text_at(route, "/handle/0/handler")
            .unwrap_or(DEFAULT_HANDLER)
            .to_string(),
        strip_prefix: text_at(route, "/handle/0/rewrite/strip_path_prefix").map(str::to_string),
    }
}

fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
