//! RESP2 value types
//!
//! Defines the data types exchanged with a RESP2 server, plus the
//! pub/sub push-frame classification used by the subscriber connection.

use bytes::Bytes;
use std::fmt;

/// RESP2 value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple strings: +OK\r\n
    SimpleString(String),

    /// Errors: -Error message\r\n
    Error(String),

    /// Integers: :1000\r\n
    Integer(i64),

    /// Bulk strings: $6\r\nfoobar\r\n
    BulkString(Bytes),

    /// Null bulk string: $-1\r\n
    Null,

    /// Arrays: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Create a bulk string from bytes
    pub fn bulk_string(b: impl Into<Bytes>) -> Self {
        RespValue::BulkString(b.into())
    }

    /// Create an array
    pub fn array(v: Vec<RespValue>) -> Self {
        RespValue::Array(v)
    }

    /// Try to extract bulk string bytes
    pub fn as_bulk_string(&self) -> Option<&Bytes> {
        match self {
            RespValue::BulkString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Try to extract array elements
    pub fn as_array(&self) -> Option<&Vec<RespValue>> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to extract integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Consume the value into UTF-8 text.
    ///
    /// Accepts simple strings and bulk strings; everything else is `None`.
    /// Replies carrying user-provided keys and fields go through here.
    pub fn into_string(self) -> Option<String> {
        match self {
            RespValue::SimpleString(s) => Some(s),
            RespValue::BulkString(b) => String::from_utf8(b.to_vec()).ok(),
            _ => None,
        }
    }

    /// Consume the value into raw bytes (bulk strings only).
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            RespValue::BulkString(b) => Some(b),
            _ => None,
        }
    }

    /// Consume an array reply into its elements.
    pub fn into_array(self) -> Option<Vec<RespValue>> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// True for the null bulk string / null array reply.
    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::Null)
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "SimpleString({})", s),
            RespValue::Error(e) => write!(f, "Error({})", e),
            RespValue::Integer(i) => write!(f, "Integer({})", i),
            RespValue::BulkString(b) => write!(f, "BulkString({} bytes)", b.len()),
            RespValue::Null => write!(f, "Null"),
            RespValue::Array(arr) => write!(f, "Array({} elements)", arr.len()),
        }
    }
}

/// Kind of push frame delivered on a subscriber connection.
///
/// A RESP2 subscriber receives three-element arrays whose first element
/// names the frame kind. Only `Message` frames carry chat payloads; the
/// other kinds are subscription confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// ["message", channel, payload]
    Message,

    /// ["subscribe", channel, subscription-count]
    Subscribe,

    /// ["unsubscribe", channel, subscription-count]
    Unsubscribe,
}

impl PushKind {
    /// Classify the tag element of a push frame.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"message" => Some(PushKind::Message),
            b"subscribe" => Some(PushKind::Subscribe),
            b"unsubscribe" => Some(PushKind::Unsubscribe),
            _ => None,
        }
    }
}

/// RESP parsing and encoding errors
#[derive(Debug, Clone, PartialEq)]
pub enum RespError {
    /// Invalid protocol format
    InvalidProtocol(String),

    /// Invalid UTF-8 in string
    InvalidUtf8,

    /// Integer overflow
    IntegerOverflow,
}

impl fmt::Display for RespError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespError::InvalidProtocol(msg) => write!(f, "Invalid protocol: {}", msg),
            RespError::InvalidUtf8 => write!(f, "Invalid UTF-8"),
            RespError::IntegerOverflow => write!(f, "Integer overflow"),
        }
    }
}

impl std::error::Error for RespError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_string_accepts_both_string_kinds() {
        assert_eq!(
            RespValue::SimpleString("OK".to_string()).into_string(),
            Some("OK".to_string())
        );
        assert_eq!(
            RespValue::bulk_string("general").into_string(),
            Some("general".to_string())
        );
        assert_eq!(RespValue::Integer(3).into_string(), None);
    }

    #[test]
    fn test_push_kind_classification() {
        assert_eq!(PushKind::from_tag(b"message"), Some(PushKind::Message));
        assert_eq!(PushKind::from_tag(b"subscribe"), Some(PushKind::Subscribe));
        assert_eq!(PushKind::from_tag(b"unsubscribe"), Some(PushKind::Unsubscribe));
        assert_eq!(PushKind::from_tag(b"psubscribe"), None);
    }
}
