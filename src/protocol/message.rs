//! Wire messages
//!
//! A frame is `cmd SEP key [SEP value] EOM`. `GET`, `DEL` and `SUB` carry a
//! key only; `SET` and `PUB` carry a key and a value. Replies are either a
//! single status byte (`SUCCESS` / `FAIL`) or a `value EOM` payload.

use thiserror::Error;

/// End of a message.
pub const EOM: u8 = 0;
/// Delimiter between message units.
pub const SEP: u8 = 30;

pub const SUCCESS: u8 = b'1';
pub const FAIL: u8 = b'0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Get,
    Set,
    Delete,
    Publish,
    Subscribe,
}

impl Command {
    /// Decodes a command byte (`g`, `s`, `d`, `P`, `S`).
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'g' => Some(Command::Get),
            b's' => Some(Command::Set),
            b'd' => Some(Command::Delete),
            b'P' => Some(Command::Publish),
            b'S' => Some(Command::Subscribe),
            _ => None,
        }
    }

    /// The byte that opens a frame for this command.
    pub fn as_byte(self) -> u8 {
        match self {
            Command::Get => b'g',
            Command::Set => b's',
            Command::Delete => b'd',
            Command::Publish => b'P',
            Command::Subscribe => b'S',
        }
    }

    /// `SET` and `PUB` carry a value after the key.
    pub fn takes_value(self) -> bool {
        matches!(self, Command::Set | Command::Publish)
    }

    /// Upper-case name used in shell output and errors.
    pub fn name(self) -> &'static str {
        match self {
            Command::Get => "GET",
            Command::Set => "SET",
            Command::Delete => "DEL",
            Command::Publish => "PUB",
            Command::Subscribe => "SUB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("ProtocolError: Message is missing EOM byte.")]
    MissingEom,
    #[error("ProtocolError: Message invokes a nonexistent command.")]
    UnknownCommand,
    #[error("ProtocolError: Message is missing key.")]
    MissingKey,
    #[error("ProtocolError: Message is nonsense.")]
    Nonsense,
    #[error("ProtocolError: Message exceeds {limit} bytes.")]
    TooLong { limit: usize },
}

/// Object representation of a client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub cmd: Command,
    pub key: Vec<u8>,
    pub arg: Option<Vec<u8>>,
}

impl Message {
    pub fn get(key: &str) -> Self {
        Self::keyed(Command::Get, key)
    }

    pub fn set(key: &str, value: &str) -> Self {
        Self::with_value(Command::Set, key, value)
    }

    pub fn delete(key: &str) -> Self {
        Self::keyed(Command::Delete, key)
    }

    pub fn publish(key: &str, value: &str) -> Self {
        Self::with_value(Command::Publish, key, value)
    }

    pub fn subscribe(key: &str) -> Self {
        Self::keyed(Command::Subscribe, key)
    }

    fn keyed(cmd: Command, key: &str) -> Self {
        Self {
            cmd,
            key: key.as_bytes().to_vec(),
            arg: None,
        }
    }

    fn with_value(cmd: Command, key: &str, value: &str) -> Self {
        Self {
            cmd,
            key: key.as_bytes().to_vec(),
            arg: Some(value.as_bytes().to_vec()),
        }
    }

    /// Encodes the message as a frame, `EOM` included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let arg_len = self.arg.as_ref().map_or(0, |a| a.len() + 1);
        let mut b = Vec::with_capacity(self.key.len() + arg_len + 3);
        b.push(self.cmd.as_byte());
        b.push(SEP);
        b.extend_from_slice(&self.key);
        if let Some(arg) = &self.arg {
            b.push(SEP);
            b.extend_from_slice(arg);
        }
        b.push(EOM);
        b
    }

    /// Parses a frame. Bytes after the first `EOM` are ignored.
    pub fn parse(b: &[u8]) -> Result<Self, ProtocolError> {
        let end = b
            .iter()
            .position(|&x| x == EOM)
            .ok_or(ProtocolError::MissingEom)?;

        let mut units = b[..end].split(|&x| x == SEP);

        let cmd = units
            .next()
            .and_then(|u| u.first().copied())
            .and_then(Command::from_byte)
            .ok_or(ProtocolError::UnknownCommand)?;

        let key = units.next().ok_or(ProtocolError::MissingKey)?.to_vec();
        let arg = units.next().map(<[u8]>::to_vec);

        if units.next().is_some() || cmd.takes_value() != arg.is_some() {
            return Err(ProtocolError::Nonsense);
        }

        Ok(Self { cmd, key, arg })
    }

    pub fn key_str(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }

    pub fn arg_str(&self) -> String {
        self.arg
            .as_deref()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .unwrap_or_default()
    }
}
