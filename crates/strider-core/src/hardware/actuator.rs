//! Motor drive seam
//!
//! The stabilizer emits three-phase commutation commands through two small
//! traits. A hardware backend maps them onto PWM registers; the mock
//! implementations here record everything for tests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Duty commands for the three phases of one motor, in PWM counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCommand {
    /// Phase A duty
    pub a: u16,
    /// Phase B duty
    pub b: u16,
    /// Phase C duty
    pub c: u16,
}

impl PhaseCommand {
    /// All phases off
    pub const ZERO: PhaseCommand = PhaseCommand { a: 0, b: 0, c: 0 };
}

/// Map a commutation command in turns onto three sinusoidal phase duties
///
/// Phases sit a third of a turn apart; each duty is
/// `(sin((command + offset) * 2pi) + 1) * 32767`, clamped into `0..=65535`.
/// Pure and stateless, so the same command always produces the same duties.
///
/// # Example
/// ```
/// use strider_core::hardware::phase_command;
///
/// let neutral = phase_command(0.0);
/// assert_eq!(neutral.a, 32767);
/// ```
pub fn phase_command(command: f32) -> PhaseCommand {
    PhaseCommand {
        a: phase_duty(command, 0.0),
        b: phase_duty(command, 1.0 / 3.0),
        c: phase_duty(command, 2.0 / 3.0),
    }
}

#[inline]
fn phase_duty(command: f32, offset: f32) -> u16 {
    let duty = (((command + offset) * TAU).sin() + 1.0) * 32767.0;
    (duty as i32).clamp(0, 65535) as u16
}

/// Three-phase motor output
pub trait MotorDrive: Send {
    /// Apply phase duties
    fn set(&mut self, command: PhaseCommand);
}

/// Drive-stage enable line
pub trait EnableLine: Send {
    /// Energize or de-energize the drive stage
    fn set(&mut self, enabled: bool);
}

/// Recording [`MotorDrive`] for tests
///
/// Clones share one recording, so a test can keep a handle while the
/// component under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockMotor {
    inner: Arc<Mutex<MockMotorInner>>,
}

#[derive(Debug, Default)]
struct MockMotorInner {
    last: PhaseCommand,
    history: Vec<PhaseCommand>,
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded phases
    pub fn last(&self) -> PhaseCommand {
        self.inner.lock().last
    }

    /// Every command seen, oldest first
    pub fn history(&self) -> Vec<PhaseCommand> {
        self.inner.lock().history.clone()
    }

    /// Number of commands seen
    pub fn command_count(&self) -> usize {
        self.inner.lock().history.len()
    }
}

impl MotorDrive for MockMotor {
    fn set(&mut self, command: PhaseCommand) {
        let mut inner = self.inner.lock();
        inner.last = command;
        inner.history.push(command);
    }
}

/// Recording [`EnableLine`] for tests
#[derive(Debug, Clone, Default)]
pub struct MockEnable {
    inner: Arc<Mutex<MockEnableInner>>,
}

#[derive(Debug, Default)]
struct MockEnableInner {
    enabled: bool,
    history: Vec<bool>,
}

impl MockEnable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current enable state
    pub fn enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Every state seen, oldest first
    pub fn history(&self) -> Vec<bool> {
        self.inner.lock().history.clone()
    }
}

impl EnableLine for MockEnable {
    fn set(&mut self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.enabled = enabled;
        inner.history.push(enabled);
    }
}
