//! Branch to allocation resolution

use crate::deploy::branch::BranchName;
use crate::errors::DeployerError;
use crate::scheduler::nomad::NomadCli;

/// The allocation that currently runs a branch's job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationHandle {
    pub job_name: String,
    pub allocation_id: String,
}

/// Resolve the allocation of a branch's job.
///
/// The first data row of `nomad job allocs` wins; the scheduler's ordering is
/// trusted as is.
pub async fn resolve_allocation(
    nomad: &NomadCli,
    branch: &BranchName,
) -> Result<AllocationHandle, DeployerError> {
    let job = branch.job_id();
    let listing = nomad.job_allocs(job.as_str()).await?;

    let allocation_id = first_allocation_id(&listing)
        .ok_or_else(|| DeployerError::NoAllocations(job.to_string()))?;

    Ok(AllocationHandle {
        job_name: job.to_string(),
        allocation_id: allocation_id.to_string(),
    })
}

/// Leading token of the first row after the header
pub fn first_allocation_id(listing: &str) -> Option<&str> {
    listing.trim().lines().nth(1)?.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_wins() {
        let listing = "\
ID        Node ID   Task Group  Version  Desired  Status   Created    Modified
8ba85cef  171a583b  web         3        run      running  5m ago     4m ago
2c4a1d7e  171a583b  web         2        stop     complete 1h ago     5m ago
";
        assert_eq!(first_allocation_id(listing), Some("8ba85cef"));
    }

    #[test]
    fn test_header_only_has_no_allocation() {
        let listing = "ID  Node ID  Task Group  Version  Desired  Status  Created  Modified\n";
        assert_eq!(first_allocation_id(listing), None);
    }

    #[test]
    fn test_empty_listing_has_no_allocation() {
        assert_eq!(first_allocation_id(""), None);
        assert_eq!(first_allocation_id("\n\n"), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let listing = "\n  ID  Node ID\n  abc123  node-1\n\n";
        assert_eq!(first_allocation_id(listing), Some("abc123"));
    }
}
