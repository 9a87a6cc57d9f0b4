//! Reverse proxy route inspection

pub mod caddy;
pub mod routes;

pub use caddy::{CaddyClient, RouteSource};
pub use routes::{list_routes, project_routes, NOT_APPLICABLE};
