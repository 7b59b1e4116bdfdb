//! Assembles a [`Sample`] from the host readers.

use chrono::Utc;
use tracing::warn;

use crate::collector::SampleError;
use crate::collector::hostname::resolve_hostname;
use crate::collector::thermal::TemperatureReader;
use crate::collector::traits::FileSystem;
use crate::collector::uptime::UptimeReader;
use crate::config::MonitorConfig;
use crate::sample::Sample;

/// Reads temperature and uptime and stamps them with the host name and time.
pub struct Sampler<F: FileSystem + Clone> {
    hostname: String,
    temperature: TemperatureReader<F>,
    uptime: Option<UptimeReader<F>>,
}

impl<F: FileSystem + Clone> Sampler<F> {
    /// Creates a sampler for `hostname` with uptime enabled.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `hostname` - Name used in every sample
    /// * `sensor_path` - Thermal zone file
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, hostname: impl Into<String>, sensor_path: &str, proc_path: &str) -> Self {
        Self {
            hostname: hostname.into(),
            temperature: TemperatureReader::new(fs.clone(), sensor_path),
            uptime: Some(UptimeReader::new(fs, proc_path)),
        }
    }

    /// Builds a sampler from configuration, resolving the host name once.
    pub fn from_config(fs: F, config: &MonitorConfig) -> Self {
        let hostname = resolve_hostname(&fs, &config.proc_path, config.hostname.as_deref());
        let sampler = Self::new(fs, hostname, &config.sensor_path, &config.proc_path);
        if config.include_uptime {
            sampler
        } else {
            sampler.without_uptime()
        }
    }

    /// Stops reading uptime; samples carry no uptime text.
    pub fn without_uptime(mut self) -> Self {
        self.uptime = None;
        self
    }

    /// Replaces the uptime reader, e.g. to disable its command fallback.
    pub fn with_uptime_reader(mut self, reader: UptimeReader<F>) -> Self {
        self.uptime = Some(reader);
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Takes one sample.
    ///
    /// A temperature failure fails the sample. An uptime failure is logged
    /// and leaves `uptime` empty.
    pub fn sample(&self) -> Result<Sample, SampleError> {
        let temperature_celsius = self.temperature.read()?;

        let uptime = self.uptime.as_ref().and_then(|reader| match reader.read() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "uptime unavailable, sample will omit it");
                None
            }
        });

        Ok(Sample {
            hostname: self.hostname.clone(),
            temperature_celsius,
            uptime,
            timestamp: Utc::now().timestamp(),
        })
    }
}
