//! Tick-based time sources
//!
//! All stabilizer timing is expressed as monotonic tick counts divided by a
//! fixed tick rate. Wall-clock time is never read on a control decision path,
//! which keeps the state machine deterministic under a mock clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic tick count from a [`Clock`]
///
/// Ticks only have meaning relative to the clock that produced them and that
/// clock's [`Clock::ticks_per_second`] rate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Ticks(pub u64);

impl Ticks {
    /// Tick zero, used as the "not yet started" sentinel by timers
    pub const ZERO: Ticks = Ticks(0);

    /// Tick difference, saturating to zero when `earlier` is ahead of `self`
    #[inline]
    pub fn saturating_sub(self, earlier: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Ticks {
    type Output = Ticks;

    #[inline]
    fn add(self, rhs: Ticks) -> Ticks {
        Ticks(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Ticks {
    #[inline]
    fn add_assign(&mut self, rhs: Ticks) {
        self.0 += rhs.0;
    }
}

impl From<u64> for Ticks {
    fn from(ticks: u64) -> Self {
        Ticks(ticks)
    }
}

/// Elapsed seconds between two tick counts at a fixed tick rate
///
/// Saturates to zero when `earlier` is ahead of `now`, so data stamped by a
/// skewed producer reads as fresh rather than underflowing.
#[inline]
pub fn elapsed_s(now: Ticks, earlier: Ticks, ticks_per_second: f32) -> f32 {
    now.saturating_sub(earlier).0 as f32 / ticks_per_second
}

/// A monotonic tick counter with a fixed rate
pub trait Clock: Send {
    /// Current tick count
    fn now(&self) -> Ticks;

    /// Fixed number of ticks per second
    fn ticks_per_second(&self) -> f32;
}

/// Wall-clock backed [`Clock`] counting ticks since construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    ticks_per_second: f32,
}

impl SystemClock {
    /// Create a clock with the given tick rate, starting at tick zero now
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            start: Instant::now(),
            ticks_per_second,
        }
    }
}

impl Default for SystemClock {
    /// Microsecond ticks
    fn default() -> Self {
        Self::new(1_000_000.0)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Ticks {
        let seconds = self.start.elapsed().as_secs_f64();
        Ticks((seconds * self.ticks_per_second as f64) as u64)
    }

    fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }
}

/// Manually advanced [`Clock`] for tests
///
/// Clones share one underlying counter, so the clone kept by a test stays
/// coherent with the clone owned by the component under test.
///
/// # Example
/// ```
/// use strider_core::clock::{Clock, MockClock, Ticks};
///
/// let clock = MockClock::new(1000.0);
/// let shared = clock.clone();
/// clock.advance_s(0.5);
/// assert_eq!(shared.now(), Ticks(500));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    ticks: Arc<AtomicU64>,
    ticks_per_second: f32,
}

impl MockClock {
    /// Create a clock at tick zero with the given tick rate
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            ticks_per_second,
        }
    }

    /// Jump to an absolute tick count
    pub fn set(&self, now: Ticks) {
        self.ticks.store(now.0, Ordering::SeqCst);
    }

    /// Advance by a tick count
    pub fn advance(&self, delta: Ticks) {
        self.ticks.fetch_add(delta.0, Ordering::SeqCst);
    }

    /// Advance by a duration in seconds, rounded to the nearest tick
    pub fn advance_s(&self, seconds: f32) {
        let delta = (seconds * self.ticks_per_second).round() as u64;
        self.ticks.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Ticks {
        Ticks(self.ticks.load(Ordering::SeqCst))
    }

    fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }
}
