//! RESP2 parser and encoder
//!
//! Implements incremental parsing from a read buffer to RespValue, and
//! encoding of client commands into the RESP array-of-bulk-strings shape.

use super::types::{RespError, RespValue};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// Parse one complete RESP frame from the front of the buffer.
///
/// Returns Ok(Some(value)) and consumes the frame if it is complete,
/// Ok(None) and consumes nothing if more data is needed,
/// Err(e) if the stream violates the protocol.
pub fn parse_frame(buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
    let mut pos = 0usize;
    match parse_at(buf, &mut pos)? {
        Some(value) => {
            // The whole frame parsed; only now consume it. A partial frame
            // never advances the buffer, so a later read can complete it.
            buf.advance(pos);
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Recursive cursor-based parse. `pos` is only meaningful when the
/// return value is `Some`.
fn parse_at(buf: &[u8], pos: &mut usize) -> Result<Option<RespValue>, RespError> {
    let line = match take_line(buf, pos) {
        Some(line) => line,
        None => return Ok(None),
    };

    if line.is_empty() {
        return Err(RespError::InvalidProtocol("empty frame line".to_string()));
    }

    let (prefix, rest) = (line[0], &line[1..]);
    match prefix {
        b'+' => Ok(Some(RespValue::SimpleString(decode_utf8(rest)?))),
        b'-' => Ok(Some(RespValue::Error(decode_utf8(rest)?))),
        b':' => Ok(Some(RespValue::Integer(decode_integer(rest)?))),
        b'$' => parse_bulk_body(buf, pos, decode_integer(rest)?),
        b'*' => parse_array_body(buf, pos, decode_integer(rest)?),
        _ => Err(RespError::InvalidProtocol(format!(
            "Unknown type prefix: {}",
            prefix as char
        ))),
    }
}

/// Bulk string body: `len` bytes of data followed by CRLF.
/// The `$len` line has already been consumed by the caller.
fn parse_bulk_body(
    buf: &[u8],
    pos: &mut usize,
    len: i64,
) -> Result<Option<RespValue>, RespError> {
    if len == -1 {
        return Ok(Some(RespValue::Null));
    }
    if len < 0 {
        return Err(RespError::InvalidProtocol(format!(
            "Invalid bulk string length: {}",
            len
        )));
    }

    let len = len as usize;
    if buf.len() < *pos + len + 2 {
        return Ok(None);
    }

    let data = Bytes::copy_from_slice(&buf[*pos..*pos + len]);
    if &buf[*pos + len..*pos + len + 2] != CRLF {
        return Err(RespError::InvalidProtocol(
            "Missing CRLF after bulk string data".to_string(),
        ));
    }
    *pos += len + 2;

    Ok(Some(RespValue::BulkString(data)))
}

/// Array body: `count` nested frames. If any element is incomplete the
/// whole array reports incomplete, and the shared cursor is discarded by
/// `parse_frame` — elements are never half-consumed.
fn parse_array_body(
    buf: &[u8],
    pos: &mut usize,
    count: i64,
) -> Result<Option<RespValue>, RespError> {
    if count == -1 {
        return Ok(Some(RespValue::Null));
    }
    if count < 0 {
        return Err(RespError::InvalidProtocol(format!(
            "Invalid array count: {}",
            count
        )));
    }

    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match parse_at(buf, pos)? {
            Some(value) => elements.push(value),
            None => return Ok(None),
        }
    }

    Ok(Some(RespValue::Array(elements)))
}

/// Take the next CRLF-terminated line starting at `pos`, advancing the
/// cursor past the terminator. Returns None when no full line is buffered.
fn take_line<'a>(buf: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let search = &buf[*pos..];
    for i in 0..search.len().saturating_sub(1) {
        if &search[i..i + 2] == CRLF {
            let line = &search[..i];
            *pos += i + 2;
            return Some(line);
        }
    }
    None
}

fn decode_utf8(bytes: &[u8]) -> Result<String, RespError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| RespError::InvalidUtf8)
}

fn decode_integer(bytes: &[u8]) -> Result<i64, RespError> {
    let s = std::str::from_utf8(bytes).map_err(|_| RespError::InvalidUtf8)?;
    s.parse::<i64>().map_err(|_| RespError::IntegerOverflow)
}

/// Encode a client command as a RESP array of bulk strings.
///
/// This is the only request shape a client sends:
/// `*N\r\n` followed by one `$len\r\ndata\r\n` per argument.
pub fn encode_command(args: &[&[u8]]) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());

    buf.put_u8(b'*');
    buf.put_slice(args.len().to_string().as_bytes());
    buf.put_slice(CRLF);

    for arg in args {
        buf.put_u8(b'$');
        buf.put_slice(arg.len().to_string().as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(arg);
        buf.put_slice(CRLF);
    }

    buf.freeze()
}
