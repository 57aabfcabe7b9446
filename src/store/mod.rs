//! The `store` module is the in-memory key/value database with per-key
//! publish/subscribe.

pub mod bucket;
pub mod engine;
pub mod topic;

pub use engine::Store;
pub use topic::SubscriberId;
