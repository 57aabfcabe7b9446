//! The `transport` module is responsible for network communication with
//! clients over plain TCP.
//!
//! It runs the accept loop and the per-connection session that translates
//! protocol frames into store operations.

pub mod session;
pub mod tcp;

pub use tcp::{bind, serve, start_server};
