//! Benchmarks for the stabilizer hot path
//!
//! Run with: cargo bench --bench stabilizer

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strider_core::clock::{MockClock, Ticks};
use strider_core::control::{PidConfig, PidState, StabState, Stabilizer, StabilizerConfig};
use strider_core::hardware::{
    phase_command, AhrsSample, BodyRates, EnableLine, EulerDeg, MotorDrive, PhaseCommand,
};
use strider_core::telemetry::TelemetryHub;

/// Discards commands; mock recorders would accumulate history across
/// millions of iterations.
struct NullMotor;

impl MotorDrive for NullMotor {
    fn set(&mut self, _command: PhaseCommand) {}
}

struct NullEnable;

impl EnableLine for NullEnable {
    fn set(&mut self, _enabled: bool) {}
}

/// Benchmark one PID application
fn bench_pid_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("PID");

    group.bench_function("apply", |b| {
        let config = PidConfig::new(0.1, 0.05, 0.01).with_ilimit(0.5);
        let mut state = PidState::default();

        b.iter(|| black_box(config.apply(&mut state, 1.0, 0.5, 0.2, 0.0, 500.0)))
    });

    group.finish();
}

/// Benchmark the three-phase table computation
fn bench_phase_command(c: &mut Criterion) {
    let mut group = c.benchmark_group("Phase Command");

    group.bench_function("from command", |b| {
        b.iter(|| black_box(phase_command(black_box(0.37))))
    });

    group.finish();
}

/// Benchmark a full operating-state sample dispatch
fn bench_handle_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stabilizer");

    group.bench_function("handle_sample operating", |b| {
        let hub = TelemetryHub::new();
        let clock = MockClock::new(1_000_000.0);
        clock.set(Ticks(1));

        let mut config = StabilizerConfig::default();
        config.pitch.pid = PidConfig::new(0.1, 0.05, 0.01).with_ilimit(0.5);
        config.yaw.pid = PidConfig::new(0.2, 0.0, 0.02);
        let mut stab = Stabilizer::new(
            Box::new(clock.clone()),
            config,
            &hub,
            Box::new(NullEnable),
            Box::new(NullMotor),
            Box::new(NullMotor),
        )
        .unwrap();

        let mut sample = AhrsSample {
            error: false,
            euler_deg: EulerDeg::new(0.0, 1.5, 30.0),
            body_rate_dps: BodyRates::new(0.4, 0.0, -0.2),
            timestamp: Ticks(1),
            rate_hz: 400.0,
        };

        // Walk through initialization before timing the hot path.
        stab.handle_sample(&sample);
        clock.advance_s(2.0);
        stab.handle_sample(&sample);
        assert_eq!(stab.state(), StabState::Operating);

        b.iter(|| {
            sample.timestamp += Ticks(2500);
            stab.handle_sample(black_box(&sample));
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pid_apply,
    bench_phase_command,
    bench_handle_sample,
);
criterion_main!(benches);
