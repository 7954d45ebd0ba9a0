//! Hardware seam: sensor sample types and actuator traits

pub mod actuator;
pub mod ahrs;

pub use actuator::{phase_command, EnableLine, MockEnable, MockMotor, MotorDrive, PhaseCommand};
pub use ahrs::{sample_channel, AhrsSample, BodyRates, EulerDeg};
