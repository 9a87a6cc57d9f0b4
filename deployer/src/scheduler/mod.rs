//! Nomad scheduler access

pub mod alloc;
pub mod nomad;
pub mod translate;

pub use alloc::{resolve_allocation, AllocationHandle};
pub use nomad::{NomadCli, NomadOptions};
pub use translate::{parse_jobs, translate_jobs, RawJob};
