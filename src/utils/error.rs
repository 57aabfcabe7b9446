//! The `error` module defines the error type shared by the server, the client
//! library and the command line tools.

use thiserror::Error;

use crate::protocol::ProtocolError;

#[derive(Error, Debug)]
pub enum JackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("Connection Pool Error: Maximum connections reached.")]
    PoolExhausted,

    #[error("Server rejected {command} command")]
    CommandFailed { command: &'static str },

    #[error("Unexpected response byte {byte:#04x} to {command} command")]
    UnexpectedResponse { command: &'static str, byte: u8 },

    #[error("Connection closed by peer")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, JackError>;
