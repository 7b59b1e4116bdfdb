//! Destinations for samples.
//!
//! A [`Sink`] takes one [`Sample`] per tick. Two are provided:
//! - [`ConsoleSink`] prints the values, one per line
//! - [`KvSink`] writes host-scoped keys into a [`KeyValueStore`]
//!   ([`RedisStore`] in production, [`MemoryStore`] in tests)

mod console;
mod kv;
mod memory;
mod redis_store;

pub use console::ConsoleSink;
pub use kv::{KeyValueStore, KvSink, temperature_key, temperature_time_key, uptime_key};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::config::{MonitorConfig, SinkKind};
use crate::sample::Sample;

/// Error type for delivering a sample.
#[derive(Debug)]
pub enum SinkError {
    /// Writing to a local stream failed.
    Io(std::io::Error),
    /// The store could not be reached, or the connection dropped or timed out.
    Connection { address: String, message: String },
    /// The store answered but rejected a write.
    Command { key: String, message: String },
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "write failed: {}", e),
            SinkError::Connection { address, message } => {
                write!(f, "store {} unavailable: {}", address, message)
            }
            SinkError::Command { key, message } => {
                write!(f, "store rejected {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

/// Destination for one sample per tick.
pub trait Sink {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Delivers one sample.
    fn emit(&mut self, sample: &Sample) -> Result<(), SinkError>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn emit(&mut self, sample: &Sample) -> Result<(), SinkError> {
        (**self).emit(sample)
    }
}

/// Builds the sink selected by the configuration.
///
/// The Redis sink connects lazily, so this never touches the network.
pub fn build_sink(config: &MonitorConfig) -> Box<dyn Sink> {
    match config.sink {
        SinkKind::Console => Box::new(ConsoleSink::stdout()),
        SinkKind::Redis => Box::new(KvSink::new(RedisStore::new(config.store.clone()))),
    }
}
