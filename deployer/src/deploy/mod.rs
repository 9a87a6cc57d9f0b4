//! Branch deployment lifecycle

pub mod branch;
pub mod controller;
pub mod inflight;

pub use branch::{BranchName, JobId};
pub use controller::{BranchLogs, DeploymentController, ScriptOptions, ScriptOutcome};
pub use inflight::{InFlight, Operation};
