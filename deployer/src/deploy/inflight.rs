//! In-flight mutating operations per branch

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::deploy::branch::BranchName;
use crate::errors::DeployerError;

/// Transient phase a branch is in while a request mutates it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deploying,
    Cleaning,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Deploying => f.write_str("deploying"),
            Operation::Cleaning => f.write_str("cleaning"),
        }
    }
}

/// Registry allowing at most one deploy or cleanup per branch at a time
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashMap<String, Operation>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the branch for `operation`, failing with a conflict if another
    /// operation holds it. The claim is released when the guard drops.
    pub fn acquire(
        &self,
        branch: &BranchName,
        operation: Operation,
    ) -> Result<InFlightGuard, DeployerError> {
        let mut active = self.lock();
        if let Some(current) = active.get(branch.as_str()) {
            return Err(DeployerError::Conflict {
                branch: branch.to_string(),
                operation: current.to_string(),
            });
        }
        active.insert(branch.to_string(), operation);

        Ok(InFlightGuard {
            active: self.active.clone(),
            branch: branch.to_string(),
        })
    }

    /// Operation currently running for a branch
    pub fn current(&self, branch: &BranchName) -> Option<Operation> {
        self.lock().get(branch.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Operation>> {
        // the map stays consistent even if a holder panicked
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the branch claim on drop
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashMap<String, Operation>>>,
    branch: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        active.remove(&self.branch);
    }
}
