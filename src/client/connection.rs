//! Client connection
//!
//! `Connection` speaks the binary protocol over one TCP socket. Request/reply
//! commands may be issued any number of times; `subscribe` consumes the
//! connection because the server turns the socket into a one-way stream.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::protocol::{Command, EOM, FAIL, Message, SUCCESS};
use crate::utils::{JackError, Result};

#[derive(Debug)]
pub struct Connection {
    stream: BufReader<TcpStream>,
}

impl Connection {
    /// Returns a connection to the given address and port.
    pub async fn connect(address: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((address, port)).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    /// Returns the value stored at `key`, or `None` when the key is unset or
    /// holds an empty string.
    pub async fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.send(&Message::get(key)).await?;
        let value = read_value(&mut self.stream)
            .await?
            .ok_or(JackError::ConnectionClosed)?;
        Ok((!value.is_empty()).then_some(value))
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.transmit(&Message::set(key, value)).await
    }

    pub async fn delete(&mut self, key: &str) -> Result<()> {
        self.transmit(&Message::delete(key)).await
    }

    /// Sets `key` to `value` and notifies its subscribers.
    pub async fn publish(&mut self, key: &str, value: &str) -> Result<()> {
        self.transmit(&Message::publish(key, value)).await
    }

    /// Turns this connection into a stream of values published on `key`.
    pub async fn subscribe(mut self, key: &str) -> Result<Subscription> {
        self.send(&Message::subscribe(key)).await?;
        Ok(Subscription {
            key: key.to_string(),
            stream: self.stream,
        })
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }

    async fn send(&mut self, msg: &Message) -> Result<()> {
        self.stream.write_all(&msg.to_bytes()).await?;
        Ok(())
    }

    async fn transmit(&mut self, msg: &Message) -> Result<()> {
        self.send(msg).await?;
        let status = match self.stream.read_u8().await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(JackError::ConnectionClosed);
            }
            Err(e) => return Err(e.into()),
        };
        check_status(msg.cmd, status)
    }
}

/// Maps a one-byte status reply to the command's result.
pub(crate) fn check_status(cmd: Command, status: u8) -> Result<()> {
    match status {
        SUCCESS => Ok(()),
        FAIL => Err(JackError::CommandFailed {
            command: cmd.name(),
        }),
        byte => Err(JackError::UnexpectedResponse {
            command: cmd.name(),
            byte,
        }),
    }
}

/// Reads one `value EOM` payload. `Ok(None)` means the peer closed cleanly
/// between payloads.
async fn read_value(stream: &mut BufReader<TcpStream>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = stream.read_until(EOM, &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.pop() != Some(EOM) {
        return Err(JackError::ConnectionClosed);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// The receiving end of a `SUB` command.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    stream: BufReader<TcpStream>,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the next published value. `Ok(None)` once the server hangs up.
    pub async fn next(&mut self) -> Result<Option<String>> {
        read_value(&mut self.stream).await
    }
}
