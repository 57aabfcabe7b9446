//! # jack
//!
//! `jack` is an in-memory key/value store with per-key publish/subscribe,
//! served over plain TCP with a small delimiter-framed protocol.
//!
//! ## Core Modules
//!
//! - `protocol`: command bytes, framing, and `Message` encode/parse.
//! - `store`: the bucketed key/value map and subscriber fan-out.
//! - `transport`: the TCP server and per-connection sessions.
//! - `client`: `Connection`, `ConnectionPool` and the streaming `ticker`.
//! - `cli`: the interactive shell and the benchmark.
//! - `config`: layered settings loading.
//! - `utils`: error type and logging setup.

pub mod cli;
pub mod client;
pub mod config;
pub mod protocol;
pub mod store;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
