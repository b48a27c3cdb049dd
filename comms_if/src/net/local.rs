//! # In-process bus
//!
//! A [`Bus`] where all nodes live in the same process. Every handle has its own inbox, which
//! receives messages on the topics that handle subscribed to in the order they were published.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex, PoisonError},
};

use super::{validate_topic, Bus, BusError, Envelope};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A handle onto a shared in-process broker.
pub struct LocalBus {
    id: usize,
    broker: Arc<Mutex<Broker>>,
}

#[derive(Default)]
struct Broker {
    inboxes: Vec<Inbox>,
}

#[derive(Default)]
struct Inbox {
    topics: HashSet<String>,
    queue: VecDeque<Envelope>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LocalBus {
    /// Create a new broker and return the first handle onto it.
    pub fn new() -> Self {
        let broker = Arc::new(Mutex::new(Broker::default()));
        Self::attach(broker)
    }

    /// Create another handle onto the same broker, with its own inbox.
    pub fn handle(&self) -> Self {
        Self::attach(self.broker.clone())
    }

    /// Number of messages waiting in this handle's inbox.
    pub fn pending(&self) -> usize {
        match self.broker.lock() {
            Ok(b) => b.inboxes[self.id].queue.len(),
            Err(_) => 0,
        }
    }

    fn attach(broker: Arc<Mutex<Broker>>) -> Self {
        let id = {
            // A poisoned broker still holds valid inboxes, the panicking holder can only have
            // been midway through a push
            let mut b = broker.lock().unwrap_or_else(PoisonError::into_inner);
            b.inboxes.push(Inbox::default());
            b.inboxes.len() - 1
        };

        Self { id, broker }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for LocalBus {
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        validate_topic(topic)?;

        let mut b = self.broker.lock().map_err(|_| BusError::Disconnected)?;
        b.inboxes[self.id].topics.insert(topic.into());

        Ok(())
    }

    fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError> {
        validate_topic(topic)?;

        let mut b = self.broker.lock().map_err(|_| BusError::Disconnected)?;
        for inbox in b.inboxes.iter_mut().filter(|i| i.topics.contains(topic)) {
            inbox.queue.push_back(Envelope {
                topic: topic.into(),
                payload: payload.into(),
            });
        }

        Ok(())
    }

    fn try_recv(&self) -> Result<Option<Envelope>, BusError> {
        let mut b = self.broker.lock().map_err(|_| BusError::Disconnected)?;
        Ok(b.inboxes[self.id].queue.pop_front())
    }
}
