//! The sampling loop.
//!
//! ```text
//!   Idle ──► Sampling ──┬──► Done      (interval == 0)
//!               ▲       │
//!               └─ Waiting ◄┘          (interval > 0)
//! ```
//!
//! The first sample is taken immediately. With a zero interval that is the
//! only one and its error is returned. Otherwise the loop waits `interval`
//! after each tick (not adjusted for how long the tick took), logs tick
//! failures and keeps going until `running` is cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::collector::{FileSystem, SampleError, Sampler};
use crate::sink::{Sink, SinkError};

/// Granularity at which a shutdown request interrupts the wait.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Error type for a single tick.
#[derive(Debug)]
pub enum TickError {
    /// Reading the host failed.
    Sample(SampleError),
    /// The sink could not take the sample.
    Sink(SinkError),
}

impl std::fmt::Display for TickError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickError::Sample(e) => write!(f, "sampling failed: {}", e),
            TickError::Sink(e) => write!(f, "emit failed: {}", e),
        }
    }
}

impl std::error::Error for TickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TickError::Sample(e) => Some(e),
            TickError::Sink(e) => Some(e),
        }
    }
}

impl From<SampleError> for TickError {
    fn from(e: SampleError) -> Self {
        TickError::Sample(e)
    }
}

impl From<SinkError> for TickError {
    fn from(e: SinkError) -> Self {
        TickError::Sink(e)
    }
}

/// Counters returned when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub failures: u64,
}

/// Drives "sample once, emit once" on a fixed cadence.
pub struct Scheduler<F: FileSystem + Clone, S: Sink> {
    sampler: Sampler<F>,
    sink: S,
    interval: Duration,
    summary: RunSummary,
}

impl<F: FileSystem + Clone, S: Sink> Scheduler<F, S> {
    /// Creates a scheduler. `Duration::ZERO` means single-shot.
    pub fn new(sampler: Sampler<F>, sink: S, interval: Duration) -> Self {
        Self {
            sampler,
            sink,
            interval,
            summary: RunSummary::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Takes one sample and hands it to the sink.
    pub fn tick(&mut self) -> Result<(), TickError> {
        self.summary.ticks += 1;
        let result = self.sample_and_emit();
        if result.is_err() {
            self.summary.failures += 1;
        }
        result
    }

    fn sample_and_emit(&mut self) -> Result<(), TickError> {
        let sample = self.sampler.sample()?;
        self.sink.emit(&sample)?;
        debug!(
            tick = self.summary.ticks,
            sink = self.sink.name(),
            temperature = sample.temperature_celsius,
            "sample emitted"
        );
        Ok(())
    }

    /// Runs until `running` is cleared, or once when the interval is zero.
    ///
    /// Only single-shot mode returns a tick error. In continuous mode the
    /// current tick always completes before the loop exits.
    pub fn run(&mut self, running: &AtomicBool) -> Result<RunSummary, TickError> {
        // First one is free.
        loop {
            let result = self.tick();

            if self.interval.is_zero() {
                result?;
                return Ok(self.summary);
            }

            if let Err(e) = result {
                error!(tick = self.summary.ticks, "{}", e);
            }

            if !self.wait(running) {
                break;
            }
        }

        info!(
            ticks = self.summary.ticks,
            failures = self.summary.failures,
            "sampling stopped"
        );
        Ok(self.summary)
    }

    /// Sleeps for one interval. Returns `false` if shutdown was requested.
    fn wait(&self, running: &AtomicBool) -> bool {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(SHUTDOWN_POLL);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
        running.load(Ordering::SeqCst)
    }
}
