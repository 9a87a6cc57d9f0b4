//! External process gateway
//!
//! Every scheduler, script and git invocation goes through a
//! [`CommandRunner`]. Commands are built as an explicit argument vector and
//! never handed to a shell.

pub mod command;
pub mod process;

pub use command::{CommandOutput, CommandRunner, CommandSpec};
pub use process::{ProcessRunner, ProcessRunnerOptions};
