//! Version control access

pub mod git;

pub use git::{parse_remote_branches, GitRemote, RepositoryOptions};
