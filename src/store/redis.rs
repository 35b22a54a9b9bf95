//! RESP2 store client
//!
//! Talks to a Redis-compatible server over two TCP connections: a
//! command connection used strictly request/response, and a subscriber
//! connection that only ever receives push frames. Subscribe and
//! unsubscribe are written fire-and-forget; their confirmations surface
//! later through [`Store::poll_message`], which is how the read loop can
//! observe (and skip) them.

use super::{PushMessage, Store, StoreError};
use crate::protocol::{encode_command, parse_frame, PushKind, RespValue};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// One TCP connection with incremental RESP framing.
struct Connection {
    stream: TcpStream,
    read_buffer: BytesMut,
}

impl Connection {
    async fn connect(addr: &str) -> Result<Self, StoreError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
        })
    }

    /// Write one command frame and flush.
    async fn send(&mut self, args: &[&[u8]]) -> Result<(), StoreError> {
        let frame = encode_command(args);
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read frames until one complete value is available.
    async fn read_frame(&mut self) -> Result<RespValue, StoreError> {
        loop {
            if let Some(frame) = parse_frame(&mut self.read_buffer)? {
                return Ok(frame);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Err(StoreError::ConnectionClosed);
            }
            debug!("Read {} bytes", n);
        }
    }

    /// Non-blocking frame read: drains whatever the socket already holds,
    /// returns None instead of waiting.
    fn poll_frame(&mut self) -> Result<Option<RespValue>, StoreError> {
        loop {
            if let Some(frame) = parse_frame(&mut self.read_buffer)? {
                return Ok(Some(frame));
            }

            match self.stream.try_read_buf(&mut self.read_buffer) {
                Ok(0) => return Err(StoreError::ConnectionClosed),
                Ok(n) => debug!("Read {} bytes", n),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One command, one reply. Error replies become [`StoreError::Server`].
    async fn round_trip(&mut self, args: &[&[u8]]) -> Result<RespValue, StoreError> {
        self.send(args).await?;
        match self.read_frame().await? {
            RespValue::Error(msg) => Err(StoreError::Server(msg)),
            reply => Ok(reply),
        }
    }
}

/// Store client speaking RESP2 over TCP.
pub struct RedisStore {
    /// Request/response connection
    cmd: Connection,

    /// Subscriber connection; receives push frames only
    sub: Connection,
}

impl RedisStore {
    /// Connect both connections to the store at `addr`.
    pub async fn connect(addr: &str) -> Result<Self, StoreError> {
        Ok(RedisStore {
            cmd: Connection::connect(addr).await?,
            sub: Connection::connect(addr).await?,
        })
    }
}

#[async_trait(?Send)]
impl Store for RedisStore {
    async fn get(&mut self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let reply = self.cmd.round_trip(&[b"GET", key.as_bytes()]).await?;
        expect_bulk_or_null(reply)
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.cmd.round_trip(&[b"SET", key.as_bytes(), value]).await?;
        Ok(())
    }

    async fn hset(&mut self, key: &str, pairs: &[(String, String)]) -> Result<(), StoreError> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(2 + pairs.len() * 2);
        args.push(b"HSET");
        args.push(key.as_bytes());
        for (field, value) in pairs {
            args.push(field.as_bytes());
            args.push(value.as_bytes());
        }
        self.cmd.round_trip(&args).await?;
        Ok(())
    }

    async fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        let reply = self.cmd.round_trip(&[b"HGETALL", key.as_bytes()]).await?;
        let flat = expect_string_array(reply)?;
        if flat.len() % 2 != 0 {
            return Err(StoreError::UnexpectedReply(
                "HGETALL reply with odd element count".to_string(),
            ));
        }

        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut it = flat.into_iter();
        while let (Some(field), Some(value)) = (it.next(), it.next()) {
            pairs.push((field, value));
        }
        Ok(pairs)
    }

    async fn sadd(&mut self, key: &str, member: &str) -> Result<bool, StoreError> {
        let reply = self
            .cmd
            .round_trip(&[b"SADD", key.as_bytes(), member.as_bytes()])
            .await?;
        Ok(expect_integer(reply)? > 0)
    }

    async fn smembers(&mut self, key: &str) -> Result<Vec<String>, StoreError> {
        let reply = self.cmd.round_trip(&[b"SMEMBERS", key.as_bytes()]).await?;
        expect_string_array(reply)
    }

    async fn spop(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        let reply = self.cmd.round_trip(&[b"SPOP", key.as_bytes()]).await?;
        match expect_bulk_or_null(reply)? {
            Some(member) => String::from_utf8(member.to_vec())
                .map(Some)
                .map_err(|_| StoreError::UnexpectedReply("non-UTF-8 set member".to_string())),
            None => Ok(None),
        }
    }

    async fn lpush(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.cmd
            .round_trip(&[b"LPUSH", key.as_bytes(), value.as_bytes()])
            .await?;
        Ok(())
    }

    async fn lrange(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let start = start.to_string();
        let stop = stop.to_string();
        let reply = self
            .cmd
            .round_trip(&[b"LRANGE", key.as_bytes(), start.as_bytes(), stop.as_bytes()])
            .await?;
        expect_string_array(reply)
    }

    async fn subscribe(&mut self, channel: &str) -> Result<(), StoreError> {
        // No reply wait: the confirmation arrives as a push frame.
        self.sub.send(&[b"SUBSCRIBE", channel.as_bytes()]).await
    }

    async fn unsubscribe(&mut self, channel: &str) -> Result<(), StoreError> {
        self.sub.send(&[b"UNSUBSCRIBE", channel.as_bytes()]).await
    }

    async fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<i64, StoreError> {
        let reply = self
            .cmd
            .round_trip(&[b"PUBLISH", channel.as_bytes(), payload])
            .await?;
        expect_integer(reply)
    }

    async fn poll_message(&mut self) -> Result<Option<PushMessage>, StoreError> {
        loop {
            match self.sub.poll_frame()? {
                None => return Ok(None),
                Some(RespValue::Error(msg)) => {
                    // A bad subscribe surfaces here; nothing to recover.
                    warn!("Error frame on subscriber connection: {}", msg);
                }
                Some(frame) => return classify_push(frame).map(Some),
            }
        }
    }
}

/// Decode a `["message"|"subscribe"|"unsubscribe", channel, payload]` push
/// frame into a [`PushMessage`].
fn classify_push(frame: RespValue) -> Result<PushMessage, StoreError> {
    let items = frame
        .into_array()
        .ok_or_else(|| StoreError::UnexpectedReply("push frame is not an array".to_string()))?;
    if items.len() != 3 {
        return Err(StoreError::UnexpectedReply(format!(
            "push frame with {} elements",
            items.len()
        )));
    }

    let mut items = items.into_iter();
    let tag = items
        .next()
        .and_then(RespValue::into_bytes)
        .ok_or_else(|| StoreError::UnexpectedReply("push frame tag is not a string".to_string()))?;
    let kind = PushKind::from_tag(&tag).ok_or_else(|| {
        StoreError::UnexpectedReply(format!(
            "unknown push frame tag: {}",
            String::from_utf8_lossy(&tag)
        ))
    })?;

    let channel = items.next().and_then(RespValue::into_string).ok_or_else(|| {
        StoreError::UnexpectedReply("push frame channel is not a string".to_string())
    })?;

    // Message payloads are bulk strings; confirmation frames carry the
    // subscription count as an integer.
    let payload = match items.next() {
        Some(RespValue::BulkString(b)) => b,
        Some(RespValue::Integer(i)) => Bytes::from(i.to_string()),
        _ => {
            return Err(StoreError::UnexpectedReply(
                "push frame payload is neither bulk string nor integer".to_string(),
            ))
        }
    };

    Ok(PushMessage {
        kind,
        channel,
        payload,
    })
}

fn expect_bulk_or_null(reply: RespValue) -> Result<Option<Bytes>, StoreError> {
    match reply {
        RespValue::Null => Ok(None),
        RespValue::BulkString(b) => Ok(Some(b)),
        other => Err(StoreError::UnexpectedReply(other.to_string())),
    }
}

fn expect_integer(reply: RespValue) -> Result<i64, StoreError> {
    reply
        .as_integer()
        .ok_or_else(|| StoreError::UnexpectedReply("expected integer reply".to_string()))
}

fn expect_string_array(reply: RespValue) -> Result<Vec<String>, StoreError> {
    let items = match reply {
        RespValue::Array(items) => items,
        RespValue::Null => return Ok(Vec::new()),
        other => return Err(StoreError::UnexpectedReply(other.to_string())),
    };

    items
        .into_iter()
        .map(|item| {
            item.into_string().ok_or_else(|| {
                StoreError::UnexpectedReply("non-string array element".to_string())
            })
        })
        .collect()
}
