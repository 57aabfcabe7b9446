//! Per-connection session
//!
//! A session starts in request/reply mode, reading one binary frame at a
//! time and answering it. Two commands switch the session into a streaming
//! mode for the rest of its life:
//! - a binary `SUB` frame turns it into a subscriber that receives
//!   `value EOM` for every value published on the key
//! - the text line `PUB <key>` turns it into a stream publisher; after the
//!   `SUCCESS` acknowledgement every chunk it sends is published on the key

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::protocol::{Command, EOM, FAIL, Message, ProtocolError, SUCCESS, TEXT_PUBLISH_PREFIX};
use crate::store::Store;
use crate::utils::Result;

/// Read size for stream publishers.
const STREAM_CHUNK_BYTES: usize = 1024;

pub async fn handle_connection<S>(stream: S, store: Arc<Store>, max_frame_bytes: usize) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);

    // Only the first bytes of a session may open a text publish stream.
    let first = stream.fill_buf().await?;
    if first.starts_with(TEXT_PUBLISH_PREFIX) {
        return publish_stream(stream, &store).await;
    }

    loop {
        if stream.fill_buf().await?.is_empty() {
            return Ok(());
        }

        let mut frame = Vec::new();
        let n = (&mut stream)
            .take(max_frame_bytes as u64)
            .read_until(EOM, &mut frame)
            .await?;

        if frame.last() != Some(&EOM) {
            let err = if n >= max_frame_bytes {
                ProtocolError::TooLong {
                    limit: max_frame_bytes,
                }
            } else {
                ProtocolError::MissingEom
            };
            stream.write_all(&[FAIL]).await?;
            return Err(err.into());
        }

        let msg = match Message::parse(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                stream.write_all(&[FAIL]).await?;
                return Err(e.into());
            }
        };

        let key = msg.key_str();
        match msg.cmd {
            Command::Get => {
                let mut reply = store.get(&key).map(String::into_bytes).unwrap_or_default();
                reply.push(EOM);
                stream.write_all(&reply).await?;
            }
            Command::Set => {
                store.set(&key, &msg.arg_str());
                stream.write_all(&[SUCCESS]).await?;
            }
            Command::Delete => {
                store.delete(&[key.as_str()]);
                stream.write_all(&[SUCCESS]).await?;
            }
            Command::Publish => {
                store.publish(&key, &msg.arg_str());
                stream.write_all(&[SUCCESS]).await?;
            }
            Command::Subscribe => {
                return subscribe_stream(stream, &store, &key).await;
            }
        }
    }
}

/// Registers the session as a subscriber of `key` and forwards values until
/// the peer goes away.
async fn subscribe_stream<S>(mut stream: BufReader<S>, store: &Store, key: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (id, mut rx) = store.subscribe(key);
    debug!("subscriber {id} registered on {key}");

    let result = forward_values(&mut stream, &mut rx).await;

    store.unsubscribe(key, &id);
    debug!("subscriber {id} removed from {key}");
    result
}

async fn forward_values<S>(stream: &mut BufReader<S>, rx: &mut UnboundedReceiver<String>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Input after SUB is ignored; reading it is how a hang-up is noticed.
    let mut discard = [0u8; 256];
    loop {
        tokio::select! {
            value = rx.recv() => {
                let Some(value) = value else {
                    return Ok(());
                };
                let mut out = value.into_bytes();
                out.push(EOM);
                stream.write_all(&out).await?;
            }
            n = stream.read(&mut discard) => {
                if n? == 0 {
                    return Ok(());
                }
            }
        }
    }
}

/// Handles the text form `PUB <key>`: acknowledge, then publish every
/// newline- or `EOM`-separated piece the peer sends.
async fn publish_stream<S>(mut stream: BufReader<S>, store: &Store) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (key, consumed) = {
        let buf = stream.fill_buf().await?;
        let line = &buf[TEXT_PUBLISH_PREFIX.len()..];
        let (raw, consumed) = match line.iter().position(|&b| b == b'\n' || b == EOM) {
            Some(i) => (&line[..i], TEXT_PUBLISH_PREFIX.len() + i + 1),
            None => (line, buf.len()),
        };
        (String::from_utf8_lossy(raw).trim().to_string(), consumed)
    };
    stream.consume(consumed);

    if key.is_empty() {
        stream.write_all(&[FAIL]).await?;
        return Err(ProtocolError::MissingKey.into());
    }
    stream.write_all(&[SUCCESS]).await?;
    debug!("stream publisher opened on {key}");

    let mut chunk = vec![0u8; STREAM_CHUNK_BYTES];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        for piece in chunk[..n].split(|&b| b == b'\n' || b == EOM) {
            let value = String::from_utf8_lossy(piece);
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let reached = store.publish(&key, value);
            if reached == 0 {
                debug!("published to {key} with no subscribers");
            }
        }
    }
}

