//! Topic management
//!
//! A `Topic` holds the live subscribers of one key. Each subscriber is the
//! sending half of an unbounded channel; a send that fails means the
//! receiving session has gone away, and the subscriber is pruned.
//!
//! Callers synchronize access through the owning bucket's lock.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

pub type SubscriberId = String;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashMap<SubscriberId, UnboundedSender<String>>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
        }
    }

    /// Add a subscriber and return the id it was registered under.
    pub fn subscribe(&mut self, sender: UnboundedSender<String>) -> SubscriberId {
        let id = Uuid::new_v4().to_string();
        self.subscribers.insert(id.clone(), sender);
        id
    }

    /// Remove a subscriber from the topic.
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Send `value` to every subscriber, dropping the ones whose receiver
    /// is gone. Returns the number of subscribers reached.
    pub fn broadcast(&mut self, value: &str) -> usize {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|_, sender| sender.send(value.to_string()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            tracing::debug!("pruned {pruned} closed subscriber(s) from {}", self.name);
        }
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
