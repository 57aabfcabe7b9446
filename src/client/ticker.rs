//! Streaming smoke-test publisher
//!
//! Opens a raw socket, sends the text handshake `PUB <key>` with no framing,
//! waits for a single reply of at most 1024 bytes and then writes the current
//! Unix time as decimal text once per interval. Nothing is read after the
//! handshake.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::config::Settings;
use crate::utils::{JackError, Result};

/// Largest handshake reply the ticker reads.
pub const RESPONSE_LIMIT: usize = 1024;

#[derive(Debug, Clone)]
pub struct TickerOptions {
    pub address: String,
    pub port: u16,
    pub key: String,
    pub interval: Duration,
    /// Stop after this many messages; `None` runs forever.
    pub count: Option<u64>,
}

impl TickerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            address: settings.client.address.clone(),
            port: settings.client.port,
            key: settings.ticker.key.clone(),
            interval: Duration::from_millis(settings.ticker.interval_ms),
            count: None,
        }
    }

    /// Rejects a zero interval before any connection is made.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(JackError::InvalidSettings {
                message: "ticker.interval_ms must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Current Unix time in seconds with microsecond precision, e.g. `1700000000.250000`.
pub fn timestamp() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// Runs the publisher. Returns the number of messages sent, which only
/// happens when `count` is set.
pub async fn run(opts: &TickerOptions) -> Result<u64> {
    opts.validate()?;
    let mut stream = TcpStream::connect((opts.address.as_str(), opts.port)).await?;
    stream.set_nodelay(true)?;

    stream
        .write_all(format!("PUB {}", opts.key).as_bytes())
        .await?;

    let mut response = [0u8; RESPONSE_LIMIT];
    let n = stream.read(&mut response).await?;
    if n == 0 {
        return Err(JackError::ConnectionClosed);
    }
    info!("{}", String::from_utf8_lossy(&response[..n]));

    let mut ticks = interval(opts.interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut sent = 0u64;
    while opts.count.is_none_or(|limit| sent < limit) {
        ticks.tick().await;
        let msg = timestamp();
        info!("publish... {msg}");
        stream.write_all(msg.as_bytes()).await?;
        sent += 1;
    }

    stream.shutdown().await?;
    Ok(sent)
}
