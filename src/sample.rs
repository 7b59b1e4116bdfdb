//! One measurement snapshot.

/// A single reading of the host, produced once per tick and handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Host name, resolved once at startup.
    pub hostname: String,
    pub temperature_celsius: f64,
    /// Free-form uptime summary; absent when uptime is disabled or unreadable.
    pub uptime: Option<String>,
    /// Wall-clock time of the sample, unix seconds.
    pub timestamp: i64,
}

impl Sample {
    /// Temperature as text. Whole degrees keep their fraction (`45.0`), so
    /// consumers always see a float.
    pub fn temperature_text(&self) -> String {
        format!("{:?}", self.temperature_celsius)
    }
}
