//! Control: PID, the stabilizer state machine, and its loop runner

pub mod pid;
pub mod runner;
pub mod stabilizer;

pub use pid::{PidConfig, PidState};
pub use runner::{Runner, RunnerConfig, RunnerHandle, RunnerStats};
pub use stabilizer::{
    AttitudeDeg, ChannelConfig, StabState, Stabilizer, StabilizerConfig, StabilizerData,
};
