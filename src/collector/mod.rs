//! Host readers for the sampling loop.
//!
//! Every OS-exposed value (thermal sensor, `/proc/uptime`, `/proc/loadavg`,
//! kernel hostname) is read through the [`FileSystem`] trait, so the readers
//! run against the real tree on Linux and against [`MockFs`] in tests.
//!
//! ```text
//!   TemperatureReader ──┐
//!   UptimeReader ───────┼──► Sampler ──► Sample
//!   hostname (once) ────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use cputemp::collector::{MockFs, TemperatureReader};
//!
//! let fs = MockFs::typical_host();
//! let reader = TemperatureReader::new(fs, "/sys/class/thermal/thermal_zone0/temp");
//! assert_eq!(reader.read().unwrap(), 45.0);
//! ```

pub mod hostname;
pub mod mock;
mod sampler;
pub mod thermal;
pub mod traits;
pub mod uptime;

use std::path::PathBuf;

pub use hostname::resolve_hostname;
pub use mock::MockFs;
pub use sampler::Sampler;
pub use thermal::{DEFAULT_SENSOR_PATH, TemperatureReader};
pub use traits::{FileSystem, RealFs};
pub use uptime::UptimeReader;

/// Error type for reading a sample from the host.
#[derive(Debug)]
pub enum SampleError {
    /// A file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A file was read but its content is not what was expected.
    Parse { path: PathBuf, content: String },
    /// Neither `/proc/uptime` nor the `uptime` command produced a summary.
    Uptime(String),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            SampleError::Parse { path, content } => {
                write!(f, "unexpected content in {}: {:?}", path.display(), content)
            }
            SampleError::Uptime(msg) => write!(f, "uptime unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
