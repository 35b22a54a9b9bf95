//! Command execution context

use crate::chat::Session;
use crate::store::Store;

/// Context provided to commands during execution
///
/// Borrows the store and the session from the chat client for the
/// duration of one dispatch; commands never own either.
pub struct CommandContext<'a> {
    /// The backing store
    pub store: &'a mut dyn Store,

    /// This process's session state
    pub session: &'a mut Session,
}

impl<'a> CommandContext<'a> {
    pub fn new(store: &'a mut dyn Store, session: &'a mut Session) -> Self {
        CommandContext { store, session }
    }
}
