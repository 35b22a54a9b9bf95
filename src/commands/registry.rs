//! Command registry
//!
//! Centralized registry for the bang commands. Lookup is case-sensitive:
//! unlike a store's command table, the chat tokens are fixed lowercase
//! strings and anything else is treated as ordinary input.

use super::{fact, help, weather, whoami, ChatCommand};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all available bang commands
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn ChatCommand>>,
}

impl CommandRegistry {
    /// Create a new command registry and register all commands
    pub fn new() -> Self {
        let mut registry = CommandRegistry {
            commands: HashMap::new(),
        };

        registry.register(Arc::new(help::HelpCommand));
        registry.register(Arc::new(weather::WeatherCommand));
        registry.register(Arc::new(fact::FactCommand));
        registry.register(Arc::new(whoami::WhoAmICommand));

        registry
    }

    fn register(&mut self, command: Arc<dyn ChatCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Get a command by its exact token
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChatCommand>> {
        self.commands.get(name).cloned()
    }

    /// All registered tokens, sorted
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
