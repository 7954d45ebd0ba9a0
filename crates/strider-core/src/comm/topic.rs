//! Publish-subscribe topics
//!
//! Fan-out of cloned messages to any number of subscribers. Publishing never
//! blocks: a subscriber whose buffer has filled up is dropped from the topic
//! rather than allowed to stall the publisher.

use crossbeam_channel as cc;
use parking_lot::RwLock;
use std::sync::Arc;

use super::Receiver;

/// Configuration for a topic
#[derive(Debug, Clone)]
pub struct TopicConfig {
    /// Maximum number of messages buffered per subscriber
    pub buffer_size: usize,
    /// Whether to keep the latest message for new subscribers
    pub latch: bool,
    /// Topic name for debugging/logging
    pub name: Arc<str>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            buffer_size: 10,
            latch: false,
            name: Arc::from(""),
        }
    }
}

impl TopicConfig {
    /// Create a new topic config with the given name
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the per-subscriber buffer size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Enable latching (keep the last message for new subscribers)
    pub fn latch(mut self, enable: bool) -> Self {
        self.latch = enable;
        self
    }
}

struct TopicInner<T> {
    config: TopicConfig,
    subscribers: Vec<cc::Sender<T>>,
    latched_value: Option<T>,
}

impl<T: Clone + Send + 'static> TopicInner<T> {
    #[inline]
    fn do_publish(&mut self, message: T) {
        if self.config.latch {
            self.latched_value = Some(message.clone());
        }
        // Keeps only subscribers that accepted the message; a full buffer
        // counts as gone.
        self.subscribers
            .retain(|tx| tx.try_send(message.clone()).is_ok());
    }
}

/// A publish-subscribe topic
///
/// # Example
/// ```
/// use strider_core::comm::Topic;
///
/// let topic = Topic::<u32>::new("ticks");
/// let sub = topic.subscribe();
/// topic.publish(7);
/// assert_eq!(sub.recv().unwrap(), 7);
/// ```
pub struct Topic<T> {
    inner: Arc<RwLock<TopicInner<T>>>,
}

impl<T: Clone + Send + 'static> Topic<T> {
    /// Create a new topic with default configuration
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_config(TopicConfig::new(name))
    }

    /// Create a new topic with custom configuration
    pub fn with_config(config: TopicConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TopicInner {
                config,
                subscribers: Vec::new(),
                latched_value: None,
            })),
        }
    }

    /// Get the topic name
    #[inline]
    pub fn name(&self) -> Arc<str> {
        self.inner.read().config.name.clone()
    }

    /// Publish a message to all subscribers
    #[inline]
    pub fn publish(&self, message: T) {
        // Early exit: nothing to deliver to and nothing to latch into.
        {
            let inner = self.inner.read();
            if inner.subscribers.is_empty() && !inner.config.latch {
                return;
            }
        }

        self.inner.write().do_publish(message);
    }

    /// Subscribe to the topic
    ///
    /// When the topic latches, the last published message is delivered first.
    pub fn subscribe(&self) -> Receiver<T> {
        let mut inner = self.inner.write();
        let (tx, rx) = cc::bounded(inner.config.buffer_size);

        if let Some(ref latched) = inner.latched_value {
            let _ = tx.try_send(latched.clone());
        }

        inner.subscribers.push(tx);
        Receiver { inner: rx }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }

    /// Get the latched value if available
    pub fn latched(&self) -> Option<T> {
        self.inner.read().latched_value.clone()
    }

    /// Create a publisher handle for this topic
    pub fn publisher(&self) -> Publisher<T> {
        Publisher {
            topic: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A publisher handle for a topic
pub struct Publisher<T> {
    topic: Arc<RwLock<TopicInner<T>>>,
}

impl<T: Clone + Send + 'static> Publisher<T> {
    /// Publish a message
    #[inline]
    pub fn publish(&self, message: T) {
        self.topic.write().do_publish(message);
    }
}

impl<T: Clone + Send + 'static> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
        }
    }
}
