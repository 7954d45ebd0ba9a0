//! strider-core: Attitude stabilizer core for the strider robotics stack
//!
//! A closed-loop pitch/yaw attitude stabilizer: AHRS samples in, three-phase
//! motor commands out, with a latching fault path and a staleness watchdog
//! between them.
//!
//! # Modules
//!
//! - [`clock`] - Tick-based time source abstraction
//! - [`comm`] - Communication primitives (channels, topics)
//! - [`config`] - RON-backed configuration store
//! - [`control`] - PID, the stabilizer state machine, and its loop runner
//! - [`hardware`] - AHRS samples and actuator interfaces
//! - [`telemetry`] - Named, latched telemetry topics
//!
//! # Data flow
//!
//! ```text
//! AHRS driver                     control thread
//! ┌───────────┐   samples   ┌───────────────────┐   enable line
//! │ estimator │──channel───►│ Runner            │──► + two motor
//! └───────────┘             │  ├─ Stabilizer    │      drives
//!                           │  └─ 1 ms watchdog │
//!                           └─────────┬─────────┘
//!                                     │ snapshots
//!                                     ▼
//!                               TelemetryHub
//! ```
//!
//! Estimation and motor commutation live outside this crate. Rust handles
//! the state machine, the control law, and the timing guarantees around
//! them.

#![warn(unused_must_use)]

pub mod clock;
pub mod comm;
pub mod config;
pub mod control;
pub mod hardware;
pub mod telemetry;

// Re-exports for convenience
pub use clock::{Clock, MockClock, SystemClock, Ticks};
pub use comm::{bounded_channel, unbounded_channel, Publisher, Receiver, Sender, Topic};
pub use config::ConfigStore;
pub use control::{
    AttitudeDeg, PidConfig, PidState, Runner, RunnerConfig, RunnerHandle, StabState, Stabilizer,
    StabilizerConfig, StabilizerData,
};
pub use hardware::{
    phase_command, sample_channel, AhrsSample, BodyRates, EnableLine, EulerDeg, MockEnable,
    MockMotor, MotorDrive, PhaseCommand,
};
pub use telemetry::TelemetryHub;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for strider-core
///
/// All errors should be handled appropriately. Use pattern matching
/// to handle specific error cases, or use `?` to propagate errors.
///
/// Control decisions never show up here: bad or stale sensor data becomes a
/// state transition with the outputs held off, not an `Err`.
///
/// # Example
/// ```ignore
/// match store.load::<StabilizerConfig>("stabilizer") {
///     Ok(config) => { /* build the stabilizer */ },
///     Err(Error::Config(msg)) => eprintln!("Bad config: {}", msg),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// Invalid, unreadable, or unparsable configuration.
    /// Handle by: validating the config file, checking parameter ranges.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Telemetry topic registration or lookup failed.
    /// Handle by: checking the topic name and message type against the registration.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Communication channel was closed unexpectedly.
    /// Handle by: checking sender/receiver status, recreating channel.
    #[error("Channel closed")]
    ChannelClosed,

    /// Channel is full (backpressure).
    /// Handle by: draining the receiver, increasing buffer size, or slowing the sender.
    #[error("Channel full")]
    ChannelFull,

    /// Control thread spawn or shutdown error.
    /// Handle by: checking thread limits, inspecting earlier log output.
    #[error("Runner error: {0}")]
    Runner(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Config(format!("I/O error: {}", e))
    }
}

/// Result type alias for strider-core operations
pub type Result<T> = std::result::Result<T, Error>;
