//! Attitude stabilizer state machine
//!
//! Sits between an AHRS estimator and a pair of three-phase motor drives.
//! Starts in `Initializing`, arms after a quiet period of valid samples,
//! closes the loop while `Operating`, and latches `Fault` until an external
//! reset. Actuators are held off in every state except `Operating`.
//!
//! Both entry points, [`Stabilizer::handle_sample`] and
//! [`Stabilizer::poll_millisecond`], must be called from a single execution
//! context; [`Runner`](crate::control::Runner) provides one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::{elapsed_s, Clock, Ticks};
use crate::comm::Publisher;
use crate::config::ConfigStore;
use crate::control::pid::{PidConfig, PidState};
use crate::hardware::actuator::{phase_command, EnableLine, MotorDrive, PhaseCommand};
use crate::hardware::ahrs::{AhrsSample, BodyRates};
use crate::telemetry::TelemetryHub;
use crate::Result;

/// Stabilizer lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabState {
    /// Waiting out a quiet period of valid AHRS data
    #[default]
    Initializing,
    /// Closed-loop control active
    Operating,
    /// Latched off; only [`Stabilizer::reset`] leaves this state
    Fault,
}

impl StabState {
    /// Static display name
    pub fn name(&self) -> &'static str {
        match self {
            StabState::Initializing => "initializing",
            StabState::Operating => "operating",
            StabState::Fault => "fault",
        }
    }
}

impl fmt::Display for StabState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one controlled axis
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Motor drive this axis commands, 1 or 2; any other value falls back
    /// to the axis default
    pub motor: u8,
    /// Control gains for this axis
    pub pid: PidConfig,
}

/// Stabilizer configuration, fixed while running
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Quiet period of valid AHRS data required before arming, in seconds
    pub initialization_period_s: f32,
    /// Maximum tolerated age of AHRS data while operating, in seconds
    pub watchdog_period_s: f32,
    /// Pitch axis
    pub pitch: ChannelConfig,
    /// Yaw axis
    pub yaw: ChannelConfig,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            initialization_period_s: 1.0,
            watchdog_period_s: 0.1,
            pitch: ChannelConfig {
                motor: 1,
                pid: PidConfig::default(),
            },
            yaw: ChannelConfig {
                motor: 2,
                pid: PidConfig::default(),
            },
        }
    }
}

/// Pitch/yaw attitude setpoint in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttitudeDeg {
    /// Pitch setpoint in degrees
    pub pitch: f32,
    /// Yaw setpoint in degrees
    pub yaw: f32,
}

/// Live stabilizer state, snapshot into telemetry after every sample
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StabilizerData {
    /// Current lifecycle state
    pub state: StabState,
    /// Pitch controller state
    pub pitch: PidState,
    /// Yaw controller state
    pub yaw: PidState,
    /// Tick the initialization quiet period started at; zero means the
    /// period has not started
    pub start_timestamp: Ticks,
    /// Attitude setpoint in degrees
    pub desired_deg: AttitudeDeg,
    /// Body-rate setpoint in degrees per second
    pub desired_body_rate_dps: BodyRates,
    /// Tick of the newest accepted AHRS data while operating
    pub last_ahrs_update: Ticks,
    /// Whether operating samples may energize the drives
    pub torque_on: bool,
}

/// Closed-loop attitude stabilizer
///
/// # Example
/// ```
/// use strider_core::clock::MockClock;
/// use strider_core::control::{Stabilizer, StabilizerConfig};
/// use strider_core::hardware::{MockEnable, MockMotor};
/// use strider_core::telemetry::TelemetryHub;
///
/// let hub = TelemetryHub::new();
/// let stab = Stabilizer::new(
///     Box::new(MockClock::new(1000.0)),
///     StabilizerConfig::default(),
///     &hub,
///     Box::new(MockEnable::new()),
///     Box::new(MockMotor::new()),
///     Box::new(MockMotor::new()),
/// )
/// .unwrap();
/// assert_eq!(stab.state().name(), "initializing");
/// ```
pub struct Stabilizer {
    clock: Box<dyn Clock>,
    config: StabilizerConfig,
    data: StabilizerData,
    telemetry: Publisher<StabilizerData>,
    enable: Box<dyn EnableLine>,
    motor1: Box<dyn MotorDrive>,
    motor2: Box<dyn MotorDrive>,
}

impl Stabilizer {
    /// Name this component registers under for telemetry and configuration
    pub const NAME: &'static str = "stabilizer";

    /// Build with an explicit config, registering telemetry under
    /// [`Self::NAME`]
    pub fn new(
        clock: Box<dyn Clock>,
        config: StabilizerConfig,
        telemetry: &TelemetryHub,
        enable: Box<dyn EnableLine>,
        motor1: Box<dyn MotorDrive>,
        motor2: Box<dyn MotorDrive>,
    ) -> Result<Self> {
        let publisher = telemetry.register::<StabilizerData>(Self::NAME)?;
        Ok(Self {
            clock,
            config,
            data: StabilizerData::default(),
            telemetry: publisher,
            enable,
            motor1,
            motor2,
        })
    }

    /// Build with the config section named [`Self::NAME`] from `store`
    ///
    /// A missing section yields the default config, matching a fresh install.
    pub fn from_store(
        clock: Box<dyn Clock>,
        store: &ConfigStore,
        telemetry: &TelemetryHub,
        enable: Box<dyn EnableLine>,
        motor1: Box<dyn MotorDrive>,
        motor2: Box<dyn MotorDrive>,
    ) -> Result<Self> {
        let config = store.load_or_default(Self::NAME)?;
        Self::new(clock, config, telemetry, enable, motor1, motor2)
    }

    /// Feed one AHRS sample through the state machine
    ///
    /// Dispatches on the current state, then publishes exactly one telemetry
    /// snapshot no matter what the sample did.
    pub fn handle_sample(&mut self, sample: &AhrsSample) {
        match self.data.state {
            StabState::Initializing => self.do_initializing(sample),
            StabState::Operating => self.do_operating(sample),
            StabState::Fault => self.do_fault(),
        }

        self.telemetry.publish(self.data);
    }

    /// Staleness watchdog; call on a steady millisecond-class cadence
    ///
    /// Only `Operating` has anything to check. Calls in the other states are
    /// no-ops, so a caller may poll unconditionally. Never publishes.
    pub fn poll_millisecond(&mut self) {
        match self.data.state {
            StabState::Operating => {
                let elapsed = elapsed_s(
                    self.clock.now(),
                    self.data.last_ahrs_update,
                    self.clock.ticks_per_second(),
                );
                if elapsed > self.config.watchdog_period_s {
                    tracing::warn!("stabilizer fault: AHRS stale for {:.3} s", elapsed);
                    self.do_fault();
                }
            }
            StabState::Initializing | StabState::Fault => {}
        }
    }

    /// Drop back to `Initializing` with outputs off and fresh data
    ///
    /// The only way out of `Fault`.
    pub fn reset(&mut self) {
        let previous = self.data.state;
        self.enable.set(false);
        self.motor1.set(PhaseCommand::ZERO);
        self.motor2.set(PhaseCommand::ZERO);
        self.data = StabilizerData::default();
        tracing::info!("stabilizer reset: {} -> initializing", previous);
    }

    /// Allow or inhibit drive energization while operating
    ///
    /// Takes effect on the next operating sample; a fault forces it back off.
    pub fn set_torque(&mut self, on: bool) {
        self.data.torque_on = on;
    }

    /// Set the attitude setpoint in degrees
    pub fn set_desired_deg(&mut self, pitch: f32, yaw: f32) {
        self.data.desired_deg = AttitudeDeg { pitch, yaw };
    }

    /// Set the body-rate setpoint in degrees per second
    pub fn set_desired_body_rate_dps(&mut self, rate: BodyRates) {
        self.data.desired_body_rate_dps = rate;
    }

    /// Current data snapshot
    pub fn data(&self) -> &StabilizerData {
        &self.data
    }

    /// Current lifecycle state
    pub fn state(&self) -> StabState {
        self.data.state
    }

    /// Active configuration
    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    fn do_initializing(&mut self, sample: &AhrsSample) {
        self.enable.set(false);

        if sample.error {
            // The quiet period starts over at the next valid sample.
            self.data.start_timestamp = Ticks::ZERO;
            return;
        }

        if self.data.start_timestamp == Ticks::ZERO {
            self.data.start_timestamp = self.clock.now();
            return;
        }

        let now = self.clock.now();
        let elapsed = elapsed_s(
            now,
            self.data.start_timestamp,
            self.clock.ticks_per_second(),
        );
        if elapsed > self.config.initialization_period_s {
            self.data.desired_deg.pitch = 0.0;
            self.data.desired_deg.yaw = sample.euler_deg.yaw;
            self.data.last_ahrs_update = now;
            self.data.state = StabState::Operating;
            tracing::info!(
                "stabilizer operating: yaw setpoint {:.1} deg",
                sample.euler_deg.yaw
            );
        }
    }

    fn do_operating(&mut self, sample: &AhrsSample) {
        if sample.error {
            tracing::warn!("stabilizer fault: AHRS error while operating");
            self.do_fault();
            return;
        }

        self.data.last_ahrs_update = sample.timestamp;
        self.enable.set(self.data.torque_on);

        let desired = self.data.desired_deg;
        let desired_rate = self.data.desired_body_rate_dps;

        let pitch_command = self.config.pitch.pid.apply(
            &mut self.data.pitch,
            sample.euler_deg.pitch,
            desired.pitch,
            sample.body_rate_dps.x,
            desired_rate.x,
            sample.rate_hz,
        );
        let yaw_command = self.config.yaw.pid.apply(
            &mut self.data.yaw,
            sample.euler_deg.yaw,
            desired.yaw,
            sample.body_rate_dps.z,
            desired_rate.z,
            sample.rate_hz,
        );

        self.pitch_motor().set(phase_command(pitch_command));
        self.yaw_motor().set(phase_command(yaw_command));
    }

    fn do_fault(&mut self) {
        self.data.state = StabState::Fault;
        self.data.torque_on = false;
        self.enable.set(false);
        self.motor1.set(PhaseCommand::ZERO);
        self.motor2.set(PhaseCommand::ZERO);
    }

    fn pitch_motor(&mut self) -> &mut dyn MotorDrive {
        match self.config.pitch.motor {
            2 => self.motor2.as_mut(),
            _ => self.motor1.as_mut(),
        }
    }

    fn yaw_motor(&mut self) -> &mut dyn MotorDrive {
        match self.config.yaw.motor {
            1 => self.motor1.as_mut(),
            _ => self.motor2.as_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::comm::Receiver;
    use crate::hardware::actuator::{MockEnable, MockMotor};
    use crate::hardware::ahrs::EulerDeg;
    use approx::assert_relative_eq;

    const TPS: f32 = 1000.0;
    const EPOCH: u64 = 5_000;

    struct Fixture {
        clock: MockClock,
        enable: MockEnable,
        motor1: MockMotor,
        motor2: MockMotor,
        snapshots: Receiver<StabilizerData>,
        stab: Stabilizer,
    }

    fn fixture(config: StabilizerConfig) -> Fixture {
        let hub = TelemetryHub::new();
        let clock = MockClock::new(TPS);
        clock.set(Ticks(EPOCH));
        let enable = MockEnable::new();
        let motor1 = MockMotor::new();
        let motor2 = MockMotor::new();
        let stab = Stabilizer::new(
            Box::new(clock.clone()),
            config,
            &hub,
            Box::new(enable.clone()),
            Box::new(motor1.clone()),
            Box::new(motor2.clone()),
        )
        .unwrap();
        let snapshots = hub.subscribe::<StabilizerData>(Stabilizer::NAME).unwrap();
        Fixture {
            clock,
            enable,
            motor1,
            motor2,
            snapshots,
            stab,
        }
    }

    fn good_sample(yaw: f32) -> AhrsSample {
        AhrsSample {
            error: false,
            euler_deg: EulerDeg::new(0.0, 0.0, yaw),
            body_rate_dps: BodyRates::default(),
            timestamp: Ticks(EPOCH),
            rate_hz: 100.0,
        }
    }

    fn error_sample() -> AhrsSample {
        AhrsSample {
            error: true,
            ..good_sample(0.0)
        }
    }

    /// Walk a fixture from power-on into `Operating` with the given setpoint
    /// yaw, leaving the clock just past the arming instant.
    fn arm(f: &mut Fixture, yaw: f32) {
        f.stab.handle_sample(&good_sample(yaw));
        f.clock
            .advance_s(f.stab.config().initialization_period_s + 0.5);
        f.stab.handle_sample(&good_sample(yaw));
        assert_eq!(f.stab.state(), StabState::Operating);
        f.snapshots.drain();
    }

    #[test]
    fn test_starts_initializing() {
        let f = fixture(StabilizerConfig::default());

        assert_eq!(f.stab.state(), StabState::Initializing);
        assert_eq!(f.stab.data().start_timestamp, Ticks::ZERO);
        assert!(!f.stab.data().torque_on);
        assert_eq!(f.stab.config().pitch.motor, 1);
        assert_eq!(f.stab.config().yaw.motor, 2);
    }

    #[test]
    fn test_error_samples_restart_quiet_period() {
        let mut f = fixture(StabilizerConfig::default());

        f.stab.handle_sample(&good_sample(0.0));
        assert_eq!(f.stab.data().start_timestamp, Ticks(EPOCH));

        f.clock.advance_s(0.3);
        f.stab.handle_sample(&error_sample());
        assert_eq!(f.stab.data().start_timestamp, Ticks::ZERO);
        assert_eq!(f.stab.state(), StabState::Initializing);

        // Next valid sample starts the period over from the current tick.
        f.clock.advance_s(0.2);
        f.stab.handle_sample(&good_sample(0.0));
        assert_eq!(f.stab.data().start_timestamp, Ticks(EPOCH + 500));

        assert_eq!(f.enable.history(), vec![false, false, false]);
        assert_eq!(f.snapshots.drain().len(), 3);
    }

    #[test]
    fn test_arming_boundary_is_strict() {
        let mut f = fixture(StabilizerConfig::default());

        f.stab.handle_sample(&good_sample(10.0));

        // Exactly the initialization period: not yet.
        f.clock.set(Ticks(EPOCH + 1000));
        f.stab.handle_sample(&good_sample(10.0));
        assert_eq!(f.stab.state(), StabState::Initializing);

        // One tick past: armed.
        f.clock.set(Ticks(EPOCH + 1001));
        f.stab.handle_sample(&good_sample(10.0));
        assert_eq!(f.stab.state(), StabState::Operating);
    }

    #[test]
    fn test_arming_captures_setpoint_and_timestamps() {
        let mut f = fixture(StabilizerConfig::default());

        f.stab.handle_sample(&good_sample(10.0));
        f.clock.set(Ticks(EPOCH + 1500));

        // Sample's own stamp differs from the clock to show which one the
        // arming path records.
        let mut arming = good_sample(33.0);
        arming.timestamp = Ticks(42);
        f.stab.handle_sample(&arming);

        let data = f.stab.data();
        assert_eq!(data.state, StabState::Operating);
        assert_relative_eq!(data.desired_deg.pitch, 0.0);
        assert_relative_eq!(data.desired_deg.yaw, 33.0);
        assert_eq!(data.last_ahrs_update, Ticks(EPOCH + 1500));
        // The arming sample itself never drives the motors.
        assert_eq!(f.motor1.command_count(), 0);
        assert_eq!(f.motor2.command_count(), 0);
        assert!(!f.enable.enabled());
    }

    #[test]
    fn test_operating_tracks_sample_timestamp() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 0.0);

        f.clock.advance_s(0.05);
        let mut sample = good_sample(0.0);
        sample.timestamp = Ticks(EPOCH + 9999);
        f.stab.handle_sample(&sample);

        assert_eq!(f.stab.data().last_ahrs_update, Ticks(EPOCH + 9999));
    }

    #[test]
    fn test_operating_drives_motors() {
        let mut config = StabilizerConfig::default();
        config.pitch.pid = PidConfig::new(0.01, 0.0, 0.0);
        let mut f = fixture(config);
        arm(&mut f, 0.0);
        f.stab.set_torque(true);

        let mut sample = good_sample(0.0);
        sample.euler_deg.pitch = 25.0;
        f.clock.advance_s(0.05);
        f.stab.handle_sample(&sample);

        // pitch error 25 deg at kp 0.01 is a quarter-turn command.
        assert_relative_eq!(f.stab.data().pitch.command, 0.25);
        assert_eq!(f.motor1.last(), phase_command(0.25));
        // Yaw gains are zero, so motor 2 idles at the neutral phases.
        assert_eq!(f.motor2.last(), phase_command(0.0));
        assert!(f.enable.enabled());
    }

    #[test]
    fn test_torque_off_keeps_enable_low() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 0.0);

        f.clock.advance_s(0.05);
        f.stab.handle_sample(&good_sample(0.0));

        // Phases are still computed; only the drive stage stays cold.
        assert!(f.motor1.command_count() > 0);
        assert!(f.motor2.command_count() > 0);
        assert!(!f.enable.enabled());
    }

    #[test]
    fn test_error_while_operating_faults() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 0.0);
        f.stab.set_torque(true);

        f.stab.handle_sample(&error_sample());

        let data = f.stab.data();
        assert_eq!(data.state, StabState::Fault);
        assert!(!data.torque_on);
        assert!(!f.enable.enabled());
        assert_eq!(f.motor1.last(), PhaseCommand::ZERO);
        assert_eq!(f.motor2.last(), PhaseCommand::ZERO);

        let published = f.snapshots.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].state, StabState::Fault);
    }

    #[test]
    fn test_fault_latches_through_samples() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 0.0);
        f.stab.handle_sample(&error_sample());
        let zeroed = f.motor1.command_count();

        // Good data afterwards does not recover; outputs are re-zeroed and a
        // snapshot still goes out for every sample.
        f.clock.advance_s(5.0);
        f.stab.handle_sample(&good_sample(0.0));
        f.stab.handle_sample(&good_sample(0.0));

        assert_eq!(f.stab.state(), StabState::Fault);
        assert_eq!(f.motor1.command_count(), zeroed + 2);
        assert_eq!(f.motor1.last(), PhaseCommand::ZERO);
        assert_eq!(f.snapshots.drain().len(), 3);
    }

    #[test]
    fn test_watchdog_boundary_is_strict() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 0.0);
        let last = f.stab.data().last_ahrs_update;

        f.clock.set(Ticks(last.0 + 99));
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Operating);

        // Exactly the watchdog period is still fresh.
        f.clock.set(Ticks(last.0 + 100));
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Operating);

        f.clock.set(Ticks(last.0 + 101));
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Fault);
        assert_eq!(f.motor1.last(), PhaseCommand::ZERO);
        assert_eq!(f.motor2.last(), PhaseCommand::ZERO);

        // The watchdog never publishes.
        assert!(f.snapshots.drain().is_empty());
    }

    #[test]
    fn test_watchdog_noop_outside_operating() {
        let mut f = fixture(StabilizerConfig::default());

        // Initializing: stale by any measure, still a no-op.
        f.clock.advance_s(60.0);
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Initializing);
        assert_eq!(f.motor1.command_count(), 0);

        arm(&mut f, 0.0);
        f.stab.handle_sample(&error_sample());
        let zeroed = f.motor1.command_count();

        // Fault: repeated polls change nothing.
        f.clock.advance_s(60.0);
        f.stab.poll_millisecond();
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Fault);
        assert_eq!(f.motor1.command_count(), zeroed);
        assert!(f.snapshots.drain().is_empty());
    }

    #[test]
    fn test_publishes_once_per_sample() {
        let mut f = fixture(StabilizerConfig::default());

        f.stab.handle_sample(&good_sample(0.0));
        f.stab.handle_sample(&error_sample());
        f.stab.poll_millisecond();
        f.stab.handle_sample(&good_sample(0.0));

        assert_eq!(f.snapshots.drain().len(), 3);
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut f = fixture(StabilizerConfig::default());
        arm(&mut f, 45.0);
        f.stab.set_torque(true);
        f.stab.handle_sample(&error_sample());
        assert_eq!(f.stab.state(), StabState::Fault);

        f.stab.reset();

        let data = f.stab.data();
        assert_eq!(data.state, StabState::Initializing);
        assert_eq!(data.start_timestamp, Ticks::ZERO);
        assert!(!data.torque_on);
        assert_relative_eq!(data.desired_deg.yaw, 0.0);
        assert!(!f.enable.enabled());
        assert_eq!(f.motor1.last(), PhaseCommand::ZERO);

        // A full re-arm works after the reset.
        f.stab.handle_sample(&good_sample(12.0));
        f.clock.advance_s(1.5);
        f.stab.handle_sample(&good_sample(12.0));
        assert_eq!(f.stab.state(), StabState::Operating);
        assert_relative_eq!(f.stab.data().desired_deg.yaw, 12.0);
    }

    #[test]
    fn test_motor_fallback_mapping() {
        // Out-of-range ids resolve to motor 1 for pitch and motor 2 for yaw.
        let mut config = StabilizerConfig::default();
        config.pitch.motor = 7;
        config.yaw.motor = 0;
        config.pitch.pid = PidConfig::new(0.01, 0.0, 0.0);
        let mut f = fixture(config);
        arm(&mut f, 0.0);

        let mut sample = good_sample(0.0);
        sample.euler_deg.pitch = 25.0;
        f.clock.advance_s(0.05);
        f.stab.handle_sample(&sample);

        assert_eq!(f.motor1.last(), phase_command(0.25));
        assert_eq!(f.motor2.last(), phase_command(0.0));
    }

    #[test]
    fn test_motor_mapping_swapped() {
        let mut config = StabilizerConfig::default();
        config.pitch.motor = 2;
        config.yaw.motor = 1;
        config.pitch.pid = PidConfig::new(0.01, 0.0, 0.0);
        let mut f = fixture(config);
        arm(&mut f, 0.0);

        let mut sample = good_sample(0.0);
        sample.euler_deg.pitch = 25.0;
        f.clock.advance_s(0.05);
        f.stab.handle_sample(&sample);

        // Pitch now lands on motor 2 and yaw on motor 1.
        assert_eq!(f.motor2.last(), phase_command(0.25));
        assert_eq!(f.motor1.last(), phase_command(0.0));
    }

    #[test]
    fn test_timer_arms_at_first_nonzero_tick() {
        let mut f = fixture(StabilizerConfig::default());
        f.clock.set(Ticks::ZERO);

        // A sample at tick zero is indistinguishable from "not started".
        f.stab.handle_sample(&good_sample(0.0));
        assert_eq!(f.stab.data().start_timestamp, Ticks::ZERO);

        f.clock.set(Ticks(10));
        f.stab.handle_sample(&good_sample(0.0));
        assert_eq!(f.stab.data().start_timestamp, Ticks(10));
    }

    #[test]
    fn test_full_timeline() {
        // One pass over the whole lifecycle: quiet period, arming with the
        // observed yaw, then a watchdog trip.
        let mut f = fixture(StabilizerConfig::default());

        f.stab.handle_sample(&good_sample(10.0));
        assert_eq!(f.stab.state(), StabState::Initializing);

        f.clock.set(Ticks(EPOCH + 1100));
        f.stab.handle_sample(&good_sample(45.0));
        let data = f.stab.data();
        assert_eq!(data.state, StabState::Operating);
        assert_relative_eq!(data.desired_deg.pitch, 0.0);
        assert_relative_eq!(data.desired_deg.yaw, 45.0);

        f.clock.set(Ticks(EPOCH + 1250));
        f.stab.poll_millisecond();
        assert_eq!(f.stab.state(), StabState::Fault);
        assert_eq!(f.motor1.last(), PhaseCommand::ZERO);
        assert_eq!(f.motor2.last(), PhaseCommand::ZERO);
        assert!(!f.enable.enabled());

        // Two samples, two snapshots; the poll added none.
        assert_eq!(f.snapshots.drain().len(), 2);
    }

    #[test]
    fn test_setpoints_feed_the_loop() {
        let mut config = StabilizerConfig::default();
        config.pitch.pid = PidConfig::new(0.01, 0.0, 0.0);
        let mut f = fixture(config);
        arm(&mut f, 0.0);

        f.stab.set_desired_deg(5.0, 90.0);
        f.stab.set_desired_body_rate_dps(BodyRates::new(1.0, 0.0, 0.0));

        f.clock.advance_s(0.05);
        f.stab.handle_sample(&good_sample(0.0));

        let data = f.stab.data();
        assert_relative_eq!(data.desired_deg.pitch, 5.0);
        assert_relative_eq!(data.desired_deg.yaw, 90.0);
        // pitch error = measured - desired = -5 at kp 0.01.
        assert_relative_eq!(data.pitch.command, -0.05);
        assert_eq!(f.motor1.last(), phase_command(-0.05));
    }

    #[test]
    fn test_from_store_reads_named_section() {
        let store: ConfigStore = r#"{
            "stabilizer": (initialization_period_s: 2.0, pitch: (motor: 2)),
        }"#
        .parse()
        .unwrap();
        let hub = TelemetryHub::new();

        let stab = Stabilizer::from_store(
            Box::new(MockClock::new(TPS)),
            &store,
            &hub,
            Box::new(MockEnable::new()),
            Box::new(MockMotor::new()),
            Box::new(MockMotor::new()),
        )
        .unwrap();

        assert_relative_eq!(stab.config().initialization_period_s, 2.0);
        assert_eq!(stab.config().pitch.motor, 2);
        // Fields the section leaves out keep their defaults.
        assert_relative_eq!(stab.config().watchdog_period_s, 0.1);
        assert_eq!(stab.config().yaw.motor, 2);
    }

    #[test]
    fn test_from_store_without_section_uses_defaults() {
        let store: ConfigStore = "{}".parse().unwrap();
        let hub = TelemetryHub::new();

        let stab = Stabilizer::from_store(
            Box::new(MockClock::new(TPS)),
            &store,
            &hub,
            Box::new(MockEnable::new()),
            Box::new(MockMotor::new()),
            Box::new(MockMotor::new()),
        )
        .unwrap();

        assert_relative_eq!(stab.config().initialization_period_s, 1.0);
        assert_eq!(stab.config().pitch.motor, 1);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(StabState::Initializing.name(), "initializing");
        assert_eq!(StabState::Operating.name(), "operating");
        assert_eq!(format!("{}", StabState::Fault), "fault");
    }
}
