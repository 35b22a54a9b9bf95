//! Bang-command dispatcher
//!
//! Routes one line of input to the matching command handler. Dispatch is
//! best-effort, not validating: empty input, unknown tokens and missing
//! required arguments are all silently ignored — the line is treated as
//! ordinary text that simply isn't a command.

use crate::commands::{CommandContext, CommandRegistry};
use anyhow::Result;
use tracing::debug;

/// Result of dispatching one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a recognized, well-formed command; nothing happened.
    Ignored,

    /// A command ran; these are its reply lines.
    Replied(Vec<String>),
}

/// Command dispatcher
pub struct Dispatcher {
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            registry: CommandRegistry::new(),
        }
    }

    /// Dispatch a line of input.
    ///
    /// Splits on whitespace; the first token is matched case-sensitively
    /// against the registry. No store operation happens unless a command
    /// actually executes.
    pub async fn dispatch(
        &self,
        line: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Dispatch> {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(token) => token,
            None => return Ok(Dispatch::Ignored),
        };
        let args: Vec<&str> = parts.collect();

        let handler = match self.registry.get(command) {
            Some(handler) => handler,
            None => {
                debug!(command, "ignoring unrecognized command");
                return Ok(Dispatch::Ignored);
            }
        };

        if args.len() < handler.min_args() {
            debug!(command, "ignoring command with missing arguments");
            return Ok(Dispatch::Ignored);
        }

        debug!(command, "dispatching");
        let reply = handler.execute(ctx, &args).await?;
        Ok(Dispatch::Replied(reply))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Session;
    use crate::commands::seed_facts;
    use crate::store::{MemoryStore, Store};

    #[tokio::test]
    async fn test_empty_line_is_a_noop() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let mut ctx = CommandContext::new(&mut store, &mut session);
        assert_eq!(dispatcher.dispatch("", &mut ctx).await.unwrap(), Dispatch::Ignored);
        assert_eq!(
            dispatcher.dispatch("   ", &mut ctx).await.unwrap(),
            Dispatch::Ignored
        );
        assert_eq!(store.ops(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored_without_store_calls() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let mut ctx = CommandContext::new(&mut store, &mut session);
        assert_eq!(
            dispatcher.dispatch("!bogus now", &mut ctx).await.unwrap(),
            Dispatch::Ignored
        );
        assert_eq!(store.ops(), 0);
    }

    #[tokio::test]
    async fn test_matching_is_case_sensitive() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let mut ctx = CommandContext::new(&mut store, &mut session);
        assert_eq!(
            dispatcher.dispatch("!WHOAMI", &mut ctx).await.unwrap(),
            Dispatch::Ignored
        );
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_ignored() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let mut ctx = CommandContext::new(&mut store, &mut session);
        assert_eq!(
            dispatcher.dispatch("!weather", &mut ctx).await.unwrap(),
            Dispatch::Ignored
        );
        assert_eq!(store.ops(), 0);
    }

    #[tokio::test]
    async fn test_whoami_without_identity_reads_nothing() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let reply = {
            let mut ctx = CommandContext::new(&mut store, &mut session);
            dispatcher.dispatch("!whoami", &mut ctx).await.unwrap()
        };

        assert_eq!(
            reply,
            Dispatch::Replied(vec!["You are not identified yet.".to_string()])
        );
        assert_eq!(store.ops(), 0);
    }

    #[tokio::test]
    async fn test_help_replies_with_banner() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let mut ctx = CommandContext::new(&mut store, &mut session);
        match dispatcher.dispatch("!help", &mut ctx).await.unwrap() {
            Dispatch::Replied(lines) => {
                assert!(lines.iter().any(|line| line.contains("!weather <city>")));
            }
            Dispatch::Ignored => panic!("!help must reply"),
        }
    }

    #[tokio::test]
    async fn test_fact_pops_a_seeded_fact() {
        let mut store = MemoryStore::new();
        seed_facts(&mut store).await.unwrap();
        let mut session = Session::new();
        let dispatcher = Dispatcher::new();

        let reply = {
            let mut ctx = CommandContext::new(&mut store, &mut session);
            dispatcher.dispatch("!fact", &mut ctx).await.unwrap()
        };

        match reply {
            Dispatch::Replied(lines) => assert_eq!(lines.len(), 1),
            Dispatch::Ignored => panic!("!fact must reply"),
        }
        // One member was popped.
        assert_eq!(store.smembers("facts").await.unwrap().len(), 2);
    }
}
