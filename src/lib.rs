//! Ferrochat - a real-time chat client over a Redis-compatible store
//!
//! All durable state (profiles, history, weather cache, facts) lives in
//! the external store; the client holds only per-process session state:
//! - Each module has a single, well-defined responsibility
//! - Soft failures are typed outcomes; only store/serialization failures
//!   propagate as errors
//! - The store is reached exclusively through the `Store` trait

pub mod chat;
pub mod clock;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod protocol;
pub mod shell;
pub mod store;

/// Re-export commonly used types
pub use chat::{ChatClient, Envelope, Session, UserProfile};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use dispatch::{Dispatch, Dispatcher};
pub use protocol::{RespError, RespValue};
pub use store::{MemoryStore, RedisStore, Store, StoreError};
