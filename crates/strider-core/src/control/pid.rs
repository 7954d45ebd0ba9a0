//! Cascaded position/rate PID
//!
//! One pass tracks both a position setpoint and a rate setpoint: the
//! proportional term acts on position error, the derivative term on rate
//! error, and the integral accumulates position error pre-scaled by the
//! integral gain. Gains and state are split so the state can live inside a
//! published telemetry snapshot.

use serde::{Deserialize, Serialize};

/// Gains and limits for one control channel
///
/// # Example
/// ```
/// use strider_core::control::{PidConfig, PidState};
///
/// let config = PidConfig::new(1.0, 0.0, 0.1).with_max_command(1.0);
/// let mut state = PidState::default();
/// let command = config.apply(&mut state, 1.5, 0.0, 0.0, 0.0, 400.0);
/// assert!(command <= 1.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// Proportional gain on position error
    pub kp: f32,
    /// Integral gain on position error
    pub ki: f32,
    /// Derivative gain on rate error
    pub kd: f32,
    /// Symmetric clamp on the accumulated integral; zero keeps the
    /// integrator off
    pub ilimit: f32,
    /// Maximum integral growth per second; negative disables the cap
    pub irate_limit: f32,
    /// Symmetric clamp on the output command
    pub max_command: f32,
    /// Output polarity, +1 or -1
    pub sign: i8,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            ilimit: 0.0,
            irate_limit: -1.0,
            max_command: f32::INFINITY,
            sign: 1,
        }
    }
}

impl PidConfig {
    /// Create a config with the given gains
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            ..Default::default()
        }
    }

    /// Set the integral clamp
    pub fn with_ilimit(mut self, ilimit: f32) -> Self {
        self.ilimit = ilimit;
        self
    }

    /// Set the per-second cap on integral growth
    pub fn with_irate_limit(mut self, irate_limit: f32) -> Self {
        self.irate_limit = irate_limit;
        self
    }

    /// Set the output clamp
    pub fn with_max_command(mut self, max_command: f32) -> Self {
        self.max_command = max_command;
        self
    }

    /// Set the output polarity
    pub fn with_sign(mut self, sign: i8) -> Self {
        self.sign = sign;
        self
    }

    /// Advance `state` by one sample and return the new command
    ///
    /// `rate_hz` is the rate this channel is actually being called at; all
    /// integral scaling divides by it, so a caller running at 400 Hz and one
    /// running at 100 Hz wind up at the same rate in real time. With zero
    /// errors and a zero integrator the command is exactly zero.
    #[inline]
    pub fn apply(
        &self,
        state: &mut PidState,
        measured: f32,
        desired: f32,
        measured_rate: f32,
        desired_rate: f32,
        rate_hz: f32,
    ) -> f32 {
        state.error = measured - desired;
        state.error_rate = measured_rate - desired_rate;

        let step = state.error * self.ki / rate_hz;
        let step = if self.irate_limit >= 0.0 {
            let max_step = self.irate_limit / rate_hz;
            limit(step, -max_step, max_step)
        } else {
            step
        };
        state.integral = limit(state.integral + step, -self.ilimit, self.ilimit);

        let command = f32::from(self.sign)
            * (self.kp * state.error + self.kd * state.error_rate + state.integral);
        state.command = limit(command, -self.max_command, self.max_command);
        state.command
    }
}

/// Controller state, kept apart from the gains so it can be snapshot into
/// telemetry alongside the rest of a component's data
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PidState {
    /// Accumulated, gain-scaled integral
    pub integral: f32,
    /// Last position error
    pub error: f32,
    /// Last rate error
    pub error_rate: f32,
    /// Last command output
    pub command: f32,
}

impl PidState {
    /// Zero the controller state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Clamp to `[min, max]` with strict comparisons; NaN passes through
#[inline]
fn limit(value: f32, min: f32, max: f32) -> f32 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}
