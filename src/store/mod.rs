//! Store access layer
//!
//! The chat client keeps no durable state of its own: everything lives in
//! an external key-value / pub-sub store. The [`Store`] trait is that
//! collaborator's contract; [`RedisStore`] speaks RESP2 over TCP and
//! [`MemoryStore`] is the embedded single-process implementation used by
//! the test suite.

mod memory;
mod redis;
mod value;

pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use value::Value;

use crate::protocol::{PushKind, RespError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// A push frame surfaced by a subscriber connection.
///
/// Every frame the store pushes is surfaced, confirmations included;
/// callers act on [`PushKind::Message`] frames and skip the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub kind: PushKind,
    pub channel: String,
    pub payload: Bytes,
}

/// Contract of the external key-value / pub-sub store.
///
/// Methods map one-to-one onto single store operations; the store's own
/// per-operation atomicity is the only consistency guarantee relied upon.
#[async_trait(?Send)]
pub trait Store {
    /// Key-value read. None when the key is absent.
    async fn get(&mut self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Key-value write (overwrite).
    async fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Set all given field/value pairs on the hash at `key`.
    async fn hset(&mut self, key: &str, pairs: &[(String, String)]) -> Result<(), StoreError>;

    /// All field/value pairs of the hash at `key`; empty when absent.
    async fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// Add a member to the set at `key`. True if it was not already present.
    async fn sadd(&mut self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// All members of the set at `key`; empty when absent.
    async fn smembers(&mut self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Remove and return one member of the set at `key`.
    async fn spop(&mut self, key: &str) -> Result<Option<String>, StoreError>;

    /// Prepend a value to the list at `key`.
    async fn lpush(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// List slice with Redis index semantics (negative = from the end,
    /// both bounds inclusive).
    async fn lrange(&mut self, key: &str, start: i64, stop: i64)
        -> Result<Vec<String>, StoreError>;

    /// Begin receiving push frames for `channel`.
    async fn subscribe(&mut self, channel: &str) -> Result<(), StoreError>;

    /// Stop receiving push frames for `channel`.
    async fn unsubscribe(&mut self, channel: &str) -> Result<(), StoreError>;

    /// Publish a payload to `channel`. Returns the receiver count.
    async fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<i64, StoreError>;

    /// Non-blocking poll for the next pending push frame.
    async fn poll_message(&mut self) -> Result<Option<PushMessage>, StoreError>;
}

/// Store access errors. These are the hard-failure class: no retry, no
/// backoff, the current operation aborts.
#[derive(Debug)]
pub enum StoreError {
    /// Transport failure
    Io(std::io::Error),

    /// RESP framing violation
    Protocol(RespError),

    /// Error reply from the store (`-ERR ...`)
    Server(String),

    /// Reply shape did not match the command sent
    UnexpectedReply(String),

    /// Operation against a key holding the wrong kind of value
    WrongType,

    /// Peer closed the connection
    ConnectionClosed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Protocol(e) => write!(f, "Protocol error: {}", e),
            StoreError::Server(msg) => write!(f, "Store error: {}", msg),
            StoreError::UnexpectedReply(msg) => write!(f, "Unexpected reply: {}", msg),
            StoreError::WrongType => write!(
                f,
                "Operation against a key holding the wrong kind of value"
            ),
            StoreError::ConnectionClosed => write!(f, "Connection closed by store"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<RespError> for StoreError {
    fn from(e: RespError) -> Self {
        StoreError::Protocol(e)
    }
}
