//! Fun fact command
//!
//! The fact set is seeded once at startup. `!fact` pops a member, which
//! drains the set over time; a pop against the drained set reseeds it
//! first, so the command always produces a fact.

use super::{ChatCommand, CommandContext};
use crate::store::{Store, StoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Key of the canned fun-fact set.
pub const FACTS_KEY: &str = "facts";

const FACTS: [&str; 3] = [
    "The sky is blue.",
    "The earth is round.",
    "The sun rises in the east.",
];

/// Insert the canned facts into the store. Already-present members are
/// left alone, so seeding is idempotent.
pub async fn seed_facts<S: Store + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    for fact in FACTS {
        store.sadd(FACTS_KEY, fact).await?;
    }
    Ok(())
}

/// `!fact` - pop and print a random fun fact
pub struct FactCommand;

#[async_trait(?Send)]
impl ChatCommand for FactCommand {
    async fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[&str]) -> Result<Vec<String>> {
        let fact = match ctx.store.spop(FACTS_KEY).await? {
            Some(fact) => fact,
            None => {
                seed_facts(ctx.store).await?;
                ctx.store
                    .spop(FACTS_KEY)
                    .await?
                    .context("fun fact set empty right after reseeding")?
            }
        };

        Ok(vec![fact])
    }

    fn name(&self) -> &'static str {
        "!fact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Session;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let mut store = MemoryStore::new();
        seed_facts(&mut store).await.unwrap();
        seed_facts(&mut store).await.unwrap();

        let members = store.smembers(FACTS_KEY).await.unwrap();
        assert_eq!(members.len(), FACTS.len());
    }

    #[tokio::test]
    async fn test_fact_reseeds_when_drained() {
        let mut store = MemoryStore::new();
        seed_facts(&mut store).await.unwrap();
        let mut session = Session::new();
        let mut ctx = CommandContext::new(&mut store, &mut session);

        // Pop well past the seeded count; every reply must be a canned fact.
        for _ in 0..(FACTS.len() * 3) {
            let reply = FactCommand.execute(&mut ctx, &[]).await.unwrap();
            assert_eq!(reply.len(), 1);
            assert!(FACTS.contains(&reply[0].as_str()));
        }
    }
}
