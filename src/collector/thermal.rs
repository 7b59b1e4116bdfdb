//! CPU temperature from the kernel thermal framework.
//!
//! `/sys/class/thermal/thermal_zone*/temp` holds a single integer in
//! millidegrees Celsius, optionally followed by a newline.

use std::path::PathBuf;

use crate::collector::SampleError;
use crate::collector::traits::FileSystem;

/// Sensor read when no path is configured.
pub const DEFAULT_SENSOR_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Reads one thermal zone. Every call goes to the file; nothing is cached.
pub struct TemperatureReader<F: FileSystem> {
    fs: F,
    sensor_path: PathBuf,
}

impl<F: FileSystem> TemperatureReader<F> {
    /// Creates a reader for the given sensor file.
    pub fn new(fs: F, sensor_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            sensor_path: sensor_path.into(),
        }
    }

    /// Reads the sensor and returns the temperature in degrees Celsius.
    pub fn read(&self) -> Result<f64, SampleError> {
        let content =
            self.fs
                .read_to_string(&self.sensor_path)
                .map_err(|source| SampleError::Io {
                    path: self.sensor_path.clone(),
                    source,
                })?;

        let millidegrees = parse_millidegrees(&content).ok_or_else(|| SampleError::Parse {
            path: self.sensor_path.clone(),
            content: content.clone(),
        })?;

        Ok(millidegrees_to_celsius(millidegrees))
    }
}

/// Parses the raw sensor content. Surrounding whitespace is ignored.
pub fn parse_millidegrees(content: &str) -> Option<i64> {
    content.trim().parse().ok()
}

pub fn millidegrees_to_celsius(raw: i64) -> f64 {
    raw as f64 / 1000.0
}
