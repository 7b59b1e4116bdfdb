//! Runtime configuration.
//!
//! Everything the sampling loop needs is carried in [`MonitorConfig`]; the
//! binary builds it from the command line and passes it in.

use std::time::Duration;

use crate::collector::DEFAULT_SENSOR_PATH;

/// Where samples go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// One value per line on standard output.
    #[default]
    Console,
    /// Host-scoped keys in Redis.
    Redis,
}

/// Connection parameters for the Redis sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index.
    pub db: i64,
    /// Applied to connect, read and write.
    pub timeout: Duration,
}

impl StoreConfig {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 6379;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// `host:port`, used in log lines and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            db: 0,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Full configuration of one monitor process.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Thermal zone file holding millidegrees Celsius.
    pub sensor_path: String,
    /// Base path to proc filesystem (usually "/proc").
    pub proc_path: String,
    /// Time between samples. `Duration::ZERO` runs once and exits.
    pub interval: Duration,
    pub sink: SinkKind,
    pub store: StoreConfig,
    pub include_uptime: bool,
    /// Overrides hostname resolution when set.
    pub hostname: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor_path: DEFAULT_SENSOR_PATH.to_string(),
            proc_path: "/proc".to_string(),
            interval: Duration::ZERO,
            sink: SinkKind::Console,
            store: StoreConfig::default(),
            include_uptime: true,
            hostname: None,
        }
    }
}

impl MonitorConfig {
    /// True when the loop stops after the first sample.
    pub fn is_single_shot(&self) -> bool {
        self.interval.is_zero()
    }
}

/// Converts a command-line frequency to an interval. Zero or negative
/// values mean single-shot.
pub fn interval_from_secs(secs: i64) -> Duration {
    if secs <= 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(secs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.sensor_path, "/sys/class/thermal/thermal_zone0/temp");
        assert_eq!(config.sink, SinkKind::Console);
        assert_eq!(config.store.address(), "localhost:6379");
        assert_eq!(config.store.db, 0);
        assert!(config.include_uptime);
        assert!(config.is_single_shot());
    }

    #[test]
    fn test_interval_from_secs() {
        assert_eq!(interval_from_secs(0), Duration::ZERO);
        assert_eq!(interval_from_secs(-10), Duration::ZERO);
        assert_eq!(interval_from_secs(30), Duration::from_secs(30));
    }
}
