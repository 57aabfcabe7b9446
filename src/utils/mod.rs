//! The `utils` module holds the pieces shared by every other module: the
//! `JackError` type and logging setup.

pub mod error;
pub mod logging;

pub use error::{JackError, Result};
