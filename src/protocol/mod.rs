//! RESP2 protocol support
//!
//! Client-side value model, incremental parser, and command encoder.

mod resp;
mod types;

pub use resp::{encode_command, parse_frame};
pub use types::{PushKind, RespError, RespValue};
