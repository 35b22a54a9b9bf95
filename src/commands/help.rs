//! Help command

use super::{ChatCommand, CommandContext};
use anyhow::Result;
use async_trait::async_trait;

/// Intro and usage banner, shown at startup and on `!help`.
pub const BANNER: &str = "\
Welcome to ferrochat, a real-time chat client.
Identify yourself before sending messages or joining a channel; identifying
again overwrites your stored information.
Special commands:
  !help            List of commands
  !weather <city>  Weather update
  !fact            Random fun fact
  !whoami          Your user information";

/// `!help` - print the command/usage banner
pub struct HelpCommand;

#[async_trait(?Send)]
impl ChatCommand for HelpCommand {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &[&str]) -> Result<Vec<String>> {
        Ok(BANNER.lines().map(str::to_string).collect())
    }

    fn name(&self) -> &'static str {
        "!help"
    }
}
