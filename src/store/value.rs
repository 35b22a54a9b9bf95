//! Value types held by the embedded store

use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};

/// The kinds of values the embedded store can hold.
///
/// Collection members are text: everything the chat client keeps in lists,
/// sets and hashes (usernames, channel names, message bodies, facts) is
/// UTF-8. Only plain key-value payloads stay binary, for the JSON blobs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Binary-safe string value
    Str(Bytes),

    /// List of values (ordered, newest pushed to the front)
    List(VecDeque<String>),

    /// Set of unique values (unordered)
    Set(HashSet<String>),

    /// Hash map (field -> value)
    Hash(HashMap<String, String>),
}

impl Value {
    /// Create a string value
    pub fn str(bytes: impl Into<Bytes>) -> Self {
        Value::Str(bytes.into())
    }

    /// Create an empty list
    pub fn empty_list() -> Self {
        Value::List(VecDeque::new())
    }

    /// Create an empty set
    pub fn empty_set() -> Self {
        Value::Set(HashSet::new())
    }

    /// Create an empty hash
    pub fn empty_hash() -> Self {
        Value::Hash(HashMap::new())
    }

    /// Try to get as string bytes
    pub fn as_str(&self) -> Option<&Bytes> {
        match self {
            Value::Str(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as list reference
    pub fn as_list(&self) -> Option<&VecDeque<String>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as mutable list
    pub fn as_list_mut(&mut self) -> Option<&mut VecDeque<String>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as set reference
    pub fn as_set(&self) -> Option<&HashSet<String>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Try to get as mutable set
    pub fn as_set_mut(&mut self) -> Option<&mut HashSet<String>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Try to get as hash reference
    pub fn as_hash(&self) -> Option<&HashMap<String, String>> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    /// Try to get as mutable hash
    pub fn as_hash_mut(&mut self) -> Option<&mut HashMap<String, String>> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }
}
