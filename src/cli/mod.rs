//! Command line tools built on the client library: the interactive shell
//! and the benchmark.

pub mod bench;
pub mod repl;

pub use repl::{ReplCommand, SyntaxError, parse_line};
