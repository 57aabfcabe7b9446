//! Interactive shell
//!
//! Reads one command per line from stdin and runs it against the server.
//! `SUB` takes over the shell: it prints `key := value` lines until the
//! process is interrupted.

use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::client::{Connection, ConnectionPool};
use crate::utils::Result;

const PROMPT_COLOR: &str = "\x1b[34;1m";
const ERROR_COLOR: &str = "\x1b[31;1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Get(Vec<String>),
    Set { key: String, value: String },
    Delete(Vec<String>),
    Publish { key: String, value: String },
    Subscribe(Vec<String>),
}

/// A line the shell could not make sense of. Displays as the usage hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError(pub String);

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.0)
    }
}

impl std::error::Error for SyntaxError {}

pub fn parse_line(line: &str) -> std::result::Result<ReplCommand, SyntaxError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((first, args)) = tokens.split_first() else {
        return Ok(ReplCommand::Empty);
    };
    let cmd = first.to_uppercase();
    let owned = || args.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    match cmd.as_str() {
        "GET" if !args.is_empty() => Ok(ReplCommand::Get(owned())),
        "GET" => Err(SyntaxError("GET key [key ...]".to_string())),
        "SET" if args.len() == 2 => Ok(ReplCommand::Set {
            key: args[0].to_string(),
            value: args[1].to_string(),
        }),
        "SET" => Err(SyntaxError("SET key value".to_string())),
        "DEL" if !args.is_empty() => Ok(ReplCommand::Delete(owned())),
        "DEL" => Err(SyntaxError("DEL key [key ...]".to_string())),
        "PUB" if args.len() == 2 => Ok(ReplCommand::Publish {
            key: args[0].to_string(),
            value: args[1].to_string(),
        }),
        "PUB" => Err(SyntaxError("PUB key value".to_string())),
        "SUB" if !args.is_empty() => Ok(ReplCommand::Subscribe(owned())),
        "SUB" => Err(SyntaxError("SUB key [key ...]".to_string())),
        _ => Err(SyntaxError(cmd)),
    }
}

pub fn prompt(address: &str, port: u16) -> String {
    format!("{PROMPT_COLOR}jack {address}:{port}>{RESET} ")
}

/// Runs a request/reply command and returns the lines to print.
pub async fn execute(conn: &mut Connection, cmd: &ReplCommand) -> Result<Vec<String>> {
    let mut out = Vec::new();
    match cmd {
        ReplCommand::Empty | ReplCommand::Subscribe(_) => {}
        ReplCommand::Get(keys) => {
            for key in keys {
                if let Some(value) = conn.get(key).await? {
                    out.push(format!("{key} := {value}"));
                }
            }
        }
        ReplCommand::Set { key, value } => {
            conn.set(key, value).await?;
            out.push("OK".to_string());
        }
        ReplCommand::Delete(keys) => {
            for key in keys {
                conn.delete(key).await?;
                out.push("OK".to_string());
            }
        }
        ReplCommand::Publish { key, value } => {
            conn.publish(key, value).await?;
            out.push("OK".to_string());
        }
    }
    Ok(out)
}

/// Opens one pooled connection per key and prints values forever.
async fn subscribe_all(pool: Arc<ConnectionPool>, keys: Vec<String>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    for key in keys {
        let conn = pool.get().await?;
        let mut sub = conn.subscribe(&key).await?;
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match sub.next().await {
                    Ok(Some(value)) => {
                        if tx.send(format!("{} := {}", sub.key(), value)).is_err() {
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        warn!("subscription to {} failed: {e}", sub.key());
                        return;
                    }
                }
            }
        });
    }
    drop(tx);

    while let Some(line) = rx.recv().await {
        println!("{line}");
    }
    Ok(())
}

pub async fn run(address: &str, port: u16, pool_size: usize) -> Result<()> {
    let pool = Arc::new(ConnectionPool::new(address, port, pool_size));
    let mut conn = pool.get().await?;

    let prompt = prompt(address, port);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            return Ok(());
        };

        let cmd = match parse_line(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{ERROR_COLOR}{e}{RESET}");
                continue;
            }
        };

        if let ReplCommand::Subscribe(keys) = cmd {
            tokio::select! {
                res = subscribe_all(pool.clone(), keys) => res?,
                _ = tokio::signal::ctrl_c() => {}
            }
            println!();
            return Ok(());
        }

        for line in execute(&mut conn, &cmd).await? {
            println!("{line}");
        }
    }
}
