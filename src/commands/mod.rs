//! Command module - Strategy pattern for CLI commands.
//!
//! Each subcommand is a separate module implementing the `CommandExecutor`
//! trait. The commands own the user-facing glue (runtime setup, status
//! output); the protocol itself lives in the library modules.

mod connect;
mod host;

pub use connect::ConnectCommand;
pub use host::HostCommand;

use anyhow::Result;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements this trait
/// to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}
