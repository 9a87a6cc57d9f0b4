//! Nomad Deployment API
//!
//! HTTP control plane that deploys and tears down per-branch application
//! instances on a Nomad cluster by running operator scripts, and reports
//! jobs, branches, reverse proxy routes and allocation logs.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod gateway;
pub mod logs;
pub mod routing;
pub mod scheduler;
pub mod server;
pub mod settings;
pub mod utils;
pub mod vcs;
