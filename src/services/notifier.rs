//! In-process change notifications for live subscriptions
//!
//! Each subscriber owns a bounded queue. Publishing never waits: a subscriber
//! whose queue is full or whose stream was dropped is removed from the topic,
//! and its stream ends after draining what it already received. Nothing is
//! buffered for subscribers that register after a publish.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Named channel that change events are published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    BookAdded,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::BookAdded => "book-added",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notifier configuration
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Per-subscriber queue capacity
    pub queue_capacity: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

struct Registry<V> {
    listeners: Mutex<HashMap<Topic, HashMap<u64, mpsc::Sender<V>>>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

impl<V> Registry<V> {
    fn remove(&self, topic: Topic, id: u64) {
        let mut listeners = self.listeners.lock();
        if let Some(topic_listeners) = listeners.get_mut(&topic) {
            topic_listeners.remove(&id);
            if topic_listeners.is_empty() {
                listeners.remove(&topic);
            }
        }
    }
}

/// Topic-keyed fan-out of events to live subscribers
pub struct ChangeNotifier<V> {
    registry: Arc<Registry<V>>,
}

impl<V> Clone for ChangeNotifier<V> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<V: Clone + Send + 'static> ChangeNotifier<V> {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            registry: Arc::new(Registry {
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                queue_capacity: config.queue_capacity.max(1),
            }),
        }
    }

    /// Register a new listener on `topic`.
    ///
    /// Every call gets an independent registration; dropping the returned
    /// stream deregisters it.
    pub fn subscribe(&self, topic: Topic) -> Subscription<V> {
        let (tx, rx) = mpsc::channel(self.registry.queue_capacity);
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);

        self.registry
            .listeners
            .lock()
            .entry(topic)
            .or_default()
            .insert(id, tx);

        debug!(topic = %topic, subscriber = id, "Subscriber registered");

        Subscription {
            id,
            topic,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `payload` to every current listener on `topic`.
    ///
    /// Returns the number of listeners that accepted it.
    pub fn publish(&self, topic: Topic, payload: V) -> usize {
        let mut listeners = self.registry.listeners.lock();
        let Some(topic_listeners) = listeners.get_mut(&topic) else {
            return 0;
        };

        let mut delivered = 0;
        topic_listeners.retain(|id, tx| match tx.try_send(payload.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    topic = %topic,
                    subscriber = id,
                    "Subscriber queue full, dropping subscriber"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(topic = %topic, subscriber = id, "Subscriber gone");
                false
            }
        });

        if topic_listeners.is_empty() {
            listeners.remove(&topic);
        }

        delivered
    }

    /// Number of listeners currently registered on `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .listeners
            .lock()
            .get(&topic)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

/// Live stream of events for one listener registration
pub struct Subscription<V> {
    id: u64,
    topic: Topic,
    rx: mpsc::Receiver<V>,
    registry: Weak<Registry<V>>,
}

impl<V> Stream for Subscription<V> {
    type Item = V;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        self.rx.poll_recv(cx)
    }
}

impl<V> Drop for Subscription<V> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.topic, self.id);
            debug!(topic = %self.topic, subscriber = self.id, "Subscriber deregistered");
        }
    }
}
