//! AHRS sample types
//!
//! The stabilizer consumes fused attitude estimates, not raw IMU readings.
//! Samples arrive over a bounded channel from whatever produces them: a
//! sensor driver, a replay, or a test.

use serde::{Deserialize, Serialize};

use crate::clock::Ticks;
use crate::comm::{bounded_channel, Receiver, Sender};

/// Attitude in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerDeg {
    /// Roll angle in degrees
    pub roll: f32,
    /// Pitch angle in degrees
    pub pitch: f32,
    /// Yaw angle in degrees
    pub yaw: f32,
}

impl EulerDeg {
    /// Create an attitude from roll, pitch, yaw in degrees
    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Angular rates about the body axes in degrees per second
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyRates {
    /// Rate about the body x axis
    pub x: f32,
    /// Rate about the body y axis
    pub y: f32,
    /// Rate about the body z axis
    pub z: f32,
}

impl BodyRates {
    /// Create a rate triple in degrees per second
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One fused attitude estimate
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AhrsSample {
    /// True when the estimator could not produce a valid solution
    pub error: bool,
    /// Fused attitude
    pub euler_deg: EulerDeg,
    /// Body angular rates
    pub body_rate_dps: BodyRates,
    /// Estimator timestamp, in the control clock's tick domain
    pub timestamp: Ticks,
    /// Rate the estimator is producing samples at, in Hz
    pub rate_hz: f32,
}

/// Create the bounded channel between an AHRS producer and the stabilizer
pub fn sample_channel(capacity: usize) -> (Sender<AhrsSample>, Receiver<AhrsSample>) {
    bounded_channel(capacity)
}
