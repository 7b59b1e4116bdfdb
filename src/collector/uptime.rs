//! Host uptime summary.
//!
//! The summary is built from `/proc/uptime` and `/proc/loadavg` in the shape
//! printed by `uptime(1)`, e.g. `up 3 days, 2:03, load average: 0.15, 0.10, 0.05`.
//! When `/proc/uptime` is unusable the `uptime` command is run instead.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::collector::SampleError;
use crate::collector::traits::FileSystem;

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;

/// Reads a free-form uptime summary. Every call reads afresh.
pub struct UptimeReader<F: FileSystem> {
    fs: F,
    proc_path: String,
    command_fallback: bool,
}

impl<F: FileSystem> UptimeReader<F> {
    /// Creates a reader rooted at `proc_path` (usually "/proc").
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            command_fallback: true,
        }
    }

    /// Disables running the `uptime` command when `/proc/uptime` is unusable.
    pub fn without_command_fallback(mut self) -> Self {
        self.command_fallback = false;
        self
    }

    pub fn read(&self) -> Result<String, SampleError> {
        match self.read_proc() {
            Ok(summary) => Ok(summary),
            Err(e) if self.command_fallback => {
                debug!(error = %e, "falling back to the uptime command");
                read_command()
            }
            Err(e) => Err(e),
        }
    }

    fn read_proc(&self) -> Result<String, SampleError> {
        let path = PathBuf::from(format!("{}/uptime", self.proc_path));
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|source| SampleError::Io {
                path: path.clone(),
                source,
            })?;
        let seconds = parse_uptime_seconds(&content).ok_or_else(|| SampleError::Parse {
            path: path.clone(),
            content: content.clone(),
        })?;

        // Load average is decoration; a missing file only shortens the summary.
        let loadavg_path = format!("{}/loadavg", self.proc_path);
        let load = self
            .fs
            .read_to_string(Path::new(&loadavg_path))
            .ok()
            .and_then(|c| parse_loadavg(&c));

        Ok(format_uptime(seconds, load))
    }
}

fn read_command() -> Result<String, SampleError> {
    let output = Command::new("uptime")
        .output()
        .map_err(|e| SampleError::Uptime(format!("cannot run uptime: {}", e)))?;

    if !output.status.success() {
        return Err(SampleError::Uptime(format!(
            "uptime exited with {}",
            output.status
        )));
    }

    let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if summary.is_empty() {
        return Err(SampleError::Uptime("uptime printed nothing".to_string()));
    }
    Ok(summary)
}

/// Parses the first field of `/proc/uptime` as whole seconds.
pub fn parse_uptime_seconds(content: &str) -> Option<u64> {
    let first = content.split_whitespace().next()?;
    let seconds: f64 = first.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(seconds as u64)
}

/// Parses the three load averages from `/proc/loadavg`.
pub fn parse_loadavg(content: &str) -> Option<(f64, f64, f64)> {
    let mut parts = content.split_whitespace();
    let load1 = parts.next()?.parse().ok()?;
    let load5 = parts.next()?.parse().ok()?;
    let load15 = parts.next()?.parse().ok()?;
    Some((load1, load5, load15))
}

/// Formats seconds since boot the way `uptime(1)` does.
pub fn format_uptime(seconds: u64, load: Option<(f64, f64, f64)>) -> String {
    let days = seconds / SECS_PER_DAY;
    let hours = (seconds % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / 60;

    let mut out = String::from("up ");
    if days > 0 {
        let plural = if days == 1 { "" } else { "s" };
        out.push_str(&format!("{} day{}, ", days, plural));
    }
    if hours > 0 {
        out.push_str(&format!("{}:{:02}", hours, minutes));
    } else {
        out.push_str(&format!("{} min", minutes));
    }

    if let Some((l1, l5, l15)) = load {
        out.push_str(&format!(", load average: {:.2}, {:.2}, {:.2}", l1, l5, l15));
    }
    out
}
