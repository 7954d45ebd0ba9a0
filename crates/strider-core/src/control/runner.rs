//! Dedicated control thread for a [`Stabilizer`]
//!
//! Owns the stabilizer, blocks on the AHRS sample channel, and keeps the
//! millisecond watchdog poll running between samples. The thread exits when
//! the sample channel closes or [`RunnerHandle::stop`] is called, and
//! [`RunnerHandle::join`] hands the stabilizer back for inspection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::comm::Receiver;
use crate::control::stabilizer::Stabilizer;
use crate::hardware::ahrs::AhrsSample;
use crate::{Error, Result};

/// Runner thread configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Cadence of [`Stabilizer::poll_millisecond`] calls
    pub poll_interval: Duration,
    /// Thread name, also used in log lines
    pub name: Arc<str>,
    /// Log a warning when a sample dispatch overruns the poll interval
    pub warn_on_overrun: bool,
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
            name: Arc::from("stabilizer_runner"),
            warn_on_overrun: true,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Arc::from(name);
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters accumulated by the runner thread
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerStats {
    /// AHRS samples dispatched
    pub samples: u64,
    /// Watchdog polls issued
    pub polls: u64,
    /// Sample dispatches that took longer than the poll interval
    pub overruns: u64,
    /// Longest single sample dispatch
    pub max_dispatch: Duration,
}

/// Handle to a running control thread
pub struct RunnerHandle {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<RunnerStats>>,
    thread: Option<thread::JoinHandle<Stabilizer>>,
}

impl RunnerHandle {
    /// Whether the control thread is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the runner counters
    pub fn stats(&self) -> RunnerStats {
        *self.stats.lock()
    }

    /// Ask the control thread to exit after its current iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop the thread and take the stabilizer back
    pub fn join(mut self) -> Result<Stabilizer> {
        self.stop();
        match self.thread.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::Runner("control thread panicked".to_string())),
            None => Err(Error::Runner("control thread already joined".to_string())),
        }
    }
}

/// Spawns and supervises the control thread
pub struct Runner;

impl Runner {
    /// Move `stabilizer` onto a new thread fed by `samples`
    pub fn spawn(
        config: RunnerConfig,
        stabilizer: Stabilizer,
        samples: Receiver<AhrsSample>,
    ) -> Result<RunnerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(RunnerStats::default()));

        let thread_running = Arc::clone(&running);
        let thread_stats = Arc::clone(&stats);
        let thread = thread::Builder::new()
            .name(config.name.to_string())
            .spawn(move || run(config, stabilizer, samples, thread_running, thread_stats))
            .map_err(|e| Error::Runner(format!("failed to spawn control thread: {}", e)))?;

        Ok(RunnerHandle {
            running,
            stats,
            thread: Some(thread),
        })
    }
}

fn run(
    config: RunnerConfig,
    mut stabilizer: Stabilizer,
    samples: Receiver<AhrsSample>,
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<RunnerStats>>,
) -> Stabilizer {
    tracing::debug!("{}: control thread started", config.name);
    let mut next_poll = Instant::now() + config.poll_interval;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= next_poll {
            stabilizer.poll_millisecond();
            stats.lock().polls += 1;
            next_poll += config.poll_interval;
            if next_poll <= now {
                // Fell behind; skip the missed polls instead of bursting.
                next_poll = now + config.poll_interval;
            }
            continue;
        }

        match samples.recv_timeout(next_poll - now) {
            Ok(Some(sample)) => {
                let started = Instant::now();
                stabilizer.handle_sample(&sample);
                let took = started.elapsed();

                let overran = took > config.poll_interval;
                {
                    let mut s = stats.lock();
                    s.samples += 1;
                    if overran {
                        s.overruns += 1;
                    }
                    if took > s.max_dispatch {
                        s.max_dispatch = took;
                    }
                }
                if overran && config.warn_on_overrun {
                    tracing::warn!(
                        "{}: sample dispatch overran poll interval by {:?}",
                        config.name,
                        took - config.poll_interval
                    );
                }
            }
            Ok(None) => {}
            Err(_) => {
                tracing::debug!("{}: sample channel closed, stopping", config.name);
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    tracing::debug!("{}: control thread exiting", config.name);
    stabilizer
}
