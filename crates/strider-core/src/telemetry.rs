//! Named telemetry topics behind one registry
//!
//! Components register a topic once by name and publish snapshots to it;
//! observers subscribe by the same name without holding a reference to the
//! component. Topics are latched, so a late subscriber immediately sees the
//! most recent snapshot.
//!
//! # Example
//! ```
//! use strider_core::telemetry::TelemetryHub;
//!
//! let hub = TelemetryHub::new();
//! let battery = hub.register::<f32>("battery_v").unwrap();
//! let sub = hub.subscribe::<f32>("battery_v").unwrap();
//!
//! battery.publish(11.7);
//! assert_eq!(sub.try_recv().unwrap(), Some(11.7));
//! ```

use std::any::Any;
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::comm::{Publisher, Receiver, Topic, TopicConfig};
use crate::{Error, Result};

/// Per-subscriber queue depth for every hub topic
const SUBSCRIBER_BUFFER: usize = 32;

/// Registry of typed, latched telemetry topics keyed by name
#[derive(Default)]
pub struct TelemetryHub {
    topics: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl TelemetryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a publisher for `name`, creating the topic on first call
    ///
    /// Registering the same name and type again returns another publisher
    /// for the existing topic. The same name with a different type is
    /// refused.
    pub fn register<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<Publisher<T>> {
        let mut topics = self.topics.write();
        if let Some(existing) = topics.get(name) {
            return match existing.downcast_ref::<Topic<T>>() {
                Some(topic) => Ok(topic.publisher()),
                None => Err(Error::Telemetry(format!(
                    "'{}' is already registered with a different type",
                    name
                ))),
            };
        }

        let topic = Topic::<T>::with_config(
            TopicConfig::new(name)
                .buffer_size(SUBSCRIBER_BUFFER)
                .latch(true),
        );
        let publisher = topic.publisher();
        topics.insert(name.to_string(), Box::new(topic));
        tracing::debug!("telemetry topic '{}' registered", name);
        Ok(publisher)
    }

    /// Subscribe to the topic `name`
    ///
    /// The topic must already be registered with message type `T`.
    pub fn subscribe<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<Receiver<T>> {
        let topics = self.topics.read();
        let entry = topics
            .get(name)
            .ok_or_else(|| Error::Telemetry(format!("no telemetry topic '{}'", name)))?;
        let topic = entry.downcast_ref::<Topic<T>>().ok_or_else(|| {
            Error::Telemetry(format!(
                "telemetry topic '{}' has a different message type",
                name
            ))
        })?;
        Ok(topic.subscribe())
    }

    /// Whether a topic named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.topics.read().contains_key(name)
    }

    /// All registered topic names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.read().keys().cloned().collect();
        names.sort();
        names
    }
}
