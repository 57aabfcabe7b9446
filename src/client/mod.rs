//! The `client` module is the jack client library: a single `Connection`,
//! a bounded `ConnectionPool`, and the streaming `ticker` publisher used to
//! smoke-test a running server.

pub mod connection;
pub mod pool;
pub mod ticker;

pub use connection::{Connection, Subscription};
pub use pool::ConnectionPool;

#[cfg(test)]
mod tests;
