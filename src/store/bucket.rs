//! A single store shard. Callers hold the bucket's lock for the whole call.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;

use crate::store::topic::{SubscriberId, Topic};

/// One shard of the store: the key/value records that hash here and the
/// subscription lists on those keys.
#[derive(Debug, Default)]
pub struct Bucket {
    pub data: HashMap<String, String>,
    pub topics: HashMap<String, Topic>,
}

impl Bucket {
    /// Returns a copy of the value at `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    /// Inserts or overwrites `key`.
    pub fn set(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    /// Stores `value` and sends it to every live subscriber of `key`.
    /// Returns the number of subscribers reached; a topic left empty is dropped.
    pub fn publish(&mut self, key: &str, value: &str) -> usize {
        self.set(key, value);

        let Some(topic) = self.topics.get_mut(key) else {
            return 0;
        };
        let reached = topic.broadcast(value);
        if topic.is_empty() {
            self.topics.remove(key);
        }
        reached
    }

    /// Adds `sender` to the topic for `key`, creating the topic on first use.
    pub fn subscribe(&mut self, key: &str, sender: UnboundedSender<String>) -> SubscriberId {
        self.topics
            .entry(key.to_string())
            .or_insert_with(|| Topic::new(key))
            .subscribe(sender)
    }

    /// Removes a subscriber. The topic goes away with its last subscriber.
    pub fn unsubscribe(&mut self, key: &str, id: &SubscriberId) -> bool {
        let Some(topic) = self.topics.get_mut(key) else {
            return false;
        };
        let removed = topic.unsubscribe(id);
        if topic.is_empty() {
            self.topics.remove(key);
        }
        removed
    }

    /// Live subscribers on `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.topics.get(key).map_or(0, |t| t.subscribers.len())
    }
}
