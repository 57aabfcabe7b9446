use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::client::connection::Connection;
use crate::utils::{JackError, Result};

#[derive(Debug, Default)]
struct PoolState {
    opened: usize,
    free: Vec<Connection>,
}

/// Keeps a bounded number of client connections to one server.
///
/// Connections handed out by `get` count against the limit until they are
/// given back with `release`. A connection that is consumed (for example by
/// `Connection::subscribe`) keeps its slot.
#[derive(Debug)]
pub struct ConnectionPool {
    address: String,
    port: u16,
    size: usize,
    state: Mutex<PoolState>,
}

impl ConnectionPool {
    pub fn new(address: &str, port: u16, size: usize) -> Self {
        Self {
            address: address.to_string(),
            port,
            size,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Gets a connection from the pool, dialing a new one if none is free
    /// and the limit allows it.
    pub async fn get(&self) -> Result<Connection> {
        {
            let mut state = self.lock();
            if let Some(conn) = state.free.pop() {
                return Ok(conn);
            }
            if state.opened >= self.size {
                return Err(JackError::PoolExhausted);
            }
            state.opened += 1;
        }

        match Connection::connect(&self.address, self.port).await {
            Ok(conn) => {
                debug!("pool opened connection to {}:{}", self.address, self.port);
                Ok(conn)
            }
            Err(e) => {
                self.lock().opened -= 1;
                Err(e)
            }
        }
    }

    /// Sends a connection back to the pool.
    pub fn release(&self, conn: Connection) {
        self.lock().free.push(conn);
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn idle(&self) -> usize {
        self.lock().free.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
