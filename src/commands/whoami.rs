//! Whoami command

use super::{ChatCommand, CommandContext};
use crate::chat::{fetch_whoami, WhoAmIOutcome};
use anyhow::Result;
use async_trait::async_trait;

/// `!whoami` - show the active user's stored information
pub struct WhoAmICommand;

#[async_trait(?Send)]
impl ChatCommand for WhoAmICommand {
    async fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[&str]) -> Result<Vec<String>> {
        let lines = match fetch_whoami(ctx.store, ctx.session).await? {
            WhoAmIOutcome::NotIdentified => vec!["You are not identified yet.".to_string()],
            WhoAmIOutcome::MissingProfile => vec!["User information not found.".to_string()],
            WhoAmIOutcome::Profile(profile) => vec![
                format!("username: {}", profile.username),
                format!("age: {}", profile.age),
                format!("gender: {}", profile.gender),
                format!("location: {}", profile.location),
            ],
        };
        Ok(lines)
    }

    fn name(&self) -> &'static str {
        "!whoami"
    }
}
