//! Store engine
//!
//! The in-memory store behind the server. It is responsible for:
//! - keeping key/value records spread over a fixed number of buckets
//! - fanning published values out to the subscribers of a key
//! - pruning subscribers whose session has gone away
//!
//! Concurrency and usage notes:
//! - The public API is synchronous and shared as `Arc<Store>`. Each bucket
//!   has its own `RwLock`, so operations on keys in different buckets never
//!   contend.
//! - Locks are held only for the map update and the channel sends, never
//!   across network I/O. Subscriber channels are unbounded, so a slow
//!   subscriber cannot stall a publisher.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::store::bucket::Bucket;
use crate::store::topic::SubscriberId;
use crate::utils::{JackError, Result};

#[derive(Debug)]
pub struct Store {
    buckets: Vec<RwLock<Bucket>>,
}

impl Store {
    /// Creates an empty store with `buckets` shards. Zero is rejected.
    pub fn new(buckets: usize) -> Result<Self> {
        if buckets == 0 {
            return Err(JackError::InvalidSettings {
                message: "store.buckets must be at least 1".to_string(),
            });
        }
        Ok(Self {
            buckets: (0..buckets).map(|_| RwLock::new(Bucket::default())).collect(),
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Maps a key to its bucket. Stable for the lifetime of the store.
    pub fn bucket_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.as_bytes().hash(&mut hasher);
        let hash = hasher.finish() as usize;
        let n = self.buckets.len();
        if n.is_power_of_two() {
            hash & (n - 1)
        } else {
            hash % n
        }
    }

    fn read(&self, key: &str) -> RwLockReadGuard<'_, Bucket> {
        self.buckets[self.bucket_index(key)]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, key: &str) -> RwLockWriteGuard<'_, Bucket> {
        self.buckets[self.bucket_index(key)]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value at `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read(key).get(key)
    }

    /// Stores `value` at `key` without notifying subscribers.
    pub fn set(&self, key: &str, value: &str) {
        self.write(key).set(key, value);
    }

    /// Deletes every listed key. Missing keys are ignored.
    pub fn delete<S: AsRef<str>>(&self, keys: &[S]) -> usize {
        let mut removed = 0;
        for key in keys {
            let key: &str = key.as_ref();
            if self.write(key).delete(key) {
                removed += 1;
            }
        }
        removed
    }

    /// Sets `key` to `value` and notifies its subscribers.
    ///
    /// Returns the number of live subscribers the value was sent to.
    pub fn publish(&self, key: &str, value: &str) -> usize {
        let reached = self.write(key).publish(key, value);
        tracing::trace!("published to {key}, reached {reached} subscriber(s)");
        reached
    }

    /// Registers a subscriber on `key`. Values published after this call
    /// arrive on the returned receiver in publish order.
    pub fn subscribe(&self, key: &str) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.write(key).subscribe(key, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, key: &str, id: &SubscriberId) -> bool {
        self.write(key).unsubscribe(key, id)
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.read(key).subscriber_count(key)
    }

    /// Number of key/value records across all buckets.
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.read().unwrap_or_else(PoisonError::into_inner).data.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
