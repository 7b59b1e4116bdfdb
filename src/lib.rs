//! cputemp - CPU temperature monitor library.
//!
//! Provides:
//! - `collector` — host readers (thermal sensor, uptime, hostname) and the `Sampler`
//! - `sink` — sample destinations (console, Redis)
//! - `scheduler` — the single-shot / continuous sampling loop
//! - `config` — runtime configuration passed in by the `cputempd` binary

pub mod collector;
pub mod config;
pub mod sample;
pub mod scheduler;
pub mod sink;

pub use config::{MonitorConfig, SinkKind, StoreConfig};
pub use sample::Sample;
pub use scheduler::{RunSummary, Scheduler, TickError};
