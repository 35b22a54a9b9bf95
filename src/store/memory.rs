//! Embedded in-memory store implementation
//!
//! Implements the full [`Store`] contract in-process, including a pub/sub
//! emulation that mirrors what a subscriber connection observes on the
//! wire: subscribe/unsubscribe confirmations arrive as push frames ahead
//! of any published messages. The test suite runs against this backend.

use super::value::Value;
use super::{PushMessage, Store, StoreError};
use crate::protocol::PushKind;
use async_trait::async_trait;
use bytes::Bytes;
use siphasher::sip::SipHasher13;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::BuildHasherDefault;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<String, Value, BuildHasherDefault<SipHasher13>>;

/// Embedded key-value store with single-process pub/sub.
pub struct MemoryStore {
    /// The main storage map
    data: StoreMap,

    /// Channels this process is subscribed to
    subscriptions: HashSet<String>,

    /// Pending push frames, oldest first
    inbox: VecDeque<PushMessage>,

    /// Number of primitive operations performed
    ops: u64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        MemoryStore {
            data: HashMap::with_hasher(BuildHasherDefault::<SipHasher13>::default()),
            subscriptions: HashSet::new(),
            inbox: VecDeque::new(),
            ops: 0,
        }
    }

    /// Number of primitive store operations performed so far
    pub fn ops(&self) -> u64 {
        self.ops
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn push_ack(&mut self, kind: PushKind, channel: &str) {
        // Confirmation payload carries the subscription count, as on the wire.
        let count = self.subscriptions.len().to_string();
        self.inbox.push_back(PushMessage {
            kind,
            channel: channel.to_string(),
            payload: Bytes::from(count),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Store for MemoryStore {
    async fn get(&mut self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.ops += 1;
        match self.data.get(key) {
            Some(value) => value
                .as_str()
                .map(|b| Some(b.clone()))
                .ok_or(StoreError::WrongType),
            None => Ok(None),
        }
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.ops += 1;
        self.data
            .insert(key.to_string(), Value::str(value.to_vec()));
        Ok(())
    }

    async fn hset(&mut self, key: &str, pairs: &[(String, String)]) -> Result<(), StoreError> {
        self.ops += 1;
        let hash = self
            .data
            .entry(key.to_string())
            .or_insert_with(Value::empty_hash)
            .as_hash_mut()
            .ok_or(StoreError::WrongType)?;
        for (field, value) in pairs {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        self.ops += 1;
        match self.data.get(key) {
            Some(value) => {
                let hash = value.as_hash().ok_or(StoreError::WrongType)?;
                Ok(hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn sadd(&mut self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.ops += 1;
        let set = self
            .data
            .entry(key.to_string())
            .or_insert_with(Value::empty_set)
            .as_set_mut()
            .ok_or(StoreError::WrongType)?;
        Ok(set.insert(member.to_string()))
    }

    async fn smembers(&mut self, key: &str) -> Result<Vec<String>, StoreError> {
        self.ops += 1;
        match self.data.get(key) {
            Some(value) => {
                let set = value.as_set().ok_or(StoreError::WrongType)?;
                Ok(set.iter().cloned().collect())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn spop(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        self.ops += 1;
        match self.data.get_mut(key) {
            Some(value) => {
                let set = value.as_set_mut().ok_or(StoreError::WrongType)?;
                // HashSet iteration order stands in for SPOP's random pick.
                let member = match set.iter().next().cloned() {
                    Some(m) => m,
                    None => return Ok(None),
                };
                set.remove(&member);
                Ok(Some(member))
            }
            None => Ok(None),
        }
    }

    async fn lpush(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ops += 1;
        let list = self
            .data
            .entry(key.to_string())
            .or_insert_with(Value::empty_list)
            .as_list_mut()
            .ok_or(StoreError::WrongType)?;
        list.push_front(value.to_string());
        Ok(())
    }

    async fn lrange(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        self.ops += 1;
        let list = match self.data.get(key) {
            Some(value) => value.as_list().ok_or(StoreError::WrongType)?,
            None => return Ok(Vec::new()),
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    async fn subscribe(&mut self, channel: &str) -> Result<(), StoreError> {
        self.ops += 1;
        self.subscriptions.insert(channel.to_string());
        self.push_ack(PushKind::Subscribe, channel);
        Ok(())
    }

    async fn unsubscribe(&mut self, channel: &str) -> Result<(), StoreError> {
        self.ops += 1;
        self.subscriptions.remove(channel);
        self.push_ack(PushKind::Unsubscribe, channel);
        Ok(())
    }

    async fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<i64, StoreError> {
        self.ops += 1;
        if !self.subscriptions.contains(channel) {
            return Ok(0);
        }
        self.inbox.push_back(PushMessage {
            kind: PushKind::Message,
            channel: channel.to_string(),
            payload: Bytes::from(payload.to_vec()),
        });
        Ok(1)
    }

    async fn poll_message(&mut self) -> Result<Option<PushMessage>, StoreError> {
        self.ops += 1;
        Ok(self.inbox.pop_front())
    }
}
