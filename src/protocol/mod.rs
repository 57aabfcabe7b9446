//! The `protocol` module defines the binary frame format spoken between jack
//! clients and the server.

pub mod message;

pub use message::{Command, EOM, FAIL, Message, ProtocolError, SEP, SUCCESS};

/// Prefix of the text form of a publish stream (`PUB <key>`).
///
/// The binary `PUB` frame is `P` followed by `SEP`, so the two never collide.
pub const TEXT_PUBLISH_PREFIX: &[u8] = b"PUB ";
