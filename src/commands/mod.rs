//! Special `!`-command module
//!
//! Provides a unified interface for the chat's bang commands through the
//! ChatCommand trait. Each command is implemented in a separate file for
//! high cohesion; the dispatcher resolves them through the registry.

mod context;
mod registry;

// Command implementations
mod fact;
mod help;
mod weather;
mod whoami;

pub use context::CommandContext;
pub use fact::seed_facts;
pub use help::BANNER;
pub use registry::CommandRegistry;
pub use weather::WeatherRecord;

use anyhow::Result;
use async_trait::async_trait;

/// Command execution trait
///
/// All bang commands implement this trait with a single execute method.
/// Execution returns the reply lines to show the user; rendering is the
/// shell's job.
#[async_trait(?Send)]
pub trait ChatCommand: Send + Sync {
    /// Execute the command with the given context and arguments
    /// (excluding the command token itself).
    async fn execute(&self, ctx: &mut CommandContext<'_>, args: &[&str]) -> Result<Vec<String>>;

    /// The command token, bang included (e.g. `!weather`).
    fn name(&self) -> &'static str;

    /// Minimum number of arguments required. Input with fewer arguments
    /// is silently ignored by the dispatcher, not rejected with an error.
    fn min_args(&self) -> usize {
        0
    }
}
