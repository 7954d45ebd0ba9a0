//! Inter-thread communication primitives
//!
//! [`channel`] carries point-to-point data such as AHRS samples; [`topic`]
//! fans telemetry snapshots out to whoever is watching.

pub mod channel;
pub mod topic;

pub use channel::{bounded_channel, unbounded_channel, Receiver, Sender};
pub use topic::{Publisher, Topic, TopicConfig};
