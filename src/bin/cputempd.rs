//! cputempd - CPU temperature monitor.
//!
//! Prints the CPU temperature (and uptime) or stores it in Redis under
//! `<hostname>.cpu.temperature`, once or every `--frequency` seconds.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use cputemp::collector::{DEFAULT_SENSOR_PATH, RealFs, Sampler};
use cputemp::config::interval_from_secs;
use cputemp::sink::build_sink;
use cputemp::{MonitorConfig, Scheduler, SinkKind, StoreConfig};

/// Display or store system CPU temperature on stdout or Redis at <hostname>.cpu.temperature.
#[derive(Parser)]
#[command(name = "cputempd", version)]
struct Args {
    /// Store values in Redis instead of printing them.
    #[arg(short, long)]
    redis: bool,

    /// Seconds between samples. 0 (or less) samples once and exits.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    frequency: i64,

    /// Thermal zone file holding millidegrees Celsius.
    #[arg(long, default_value = DEFAULT_SENSOR_PATH)]
    sensor_path: String,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Redis host.
    #[arg(long, env = "REDIS_HOST", default_value = StoreConfig::DEFAULT_HOST)]
    redis_host: String,

    /// Redis port.
    #[arg(long, env = "REDIS_PORT", default_value_t = StoreConfig::DEFAULT_PORT)]
    redis_port: u16,

    /// Redis logical database.
    #[arg(long, env = "REDIS_DB", default_value_t = 0)]
    redis_db: i64,

    /// Connect/read/write timeout for Redis, in seconds.
    #[arg(long, default_value_t = 5)]
    redis_timeout: u64,

    /// Host name used in Redis keys (default: the kernel hostname).
    #[arg(long)]
    hostname: Option<String>,

    /// Do not read or publish uptime.
    #[arg(long)]
    no_uptime: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> MonitorConfig {
        MonitorConfig {
            sensor_path: self.sensor_path,
            proc_path: self.proc_path,
            interval: interval_from_secs(self.frequency),
            sink: if self.redis {
                SinkKind::Redis
            } else {
                SinkKind::Console
            },
            store: StoreConfig {
                host: self.redis_host,
                port: self.redis_port,
                db: self.redis_db,
                timeout: Duration::from_secs(self.redis_timeout.max(1)),
            },
            include_uptime: !self.no_uptime,
            hostname: self.hostname,
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr; stdout is reserved for console samples.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["cputempd", "cputemp"] {
        if let Ok(directive) = format!("{}={}", target, level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = args.into_config();

    info!("cputempd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: frequency={}s, sink={:?}, sensor={}, uptime={}",
        config.interval.as_secs(),
        config.sink,
        config.sensor_path,
        config.include_uptime
    );
    if config.sink == SinkKind::Redis {
        info!(
            "Redis: {} db={} timeout={}s",
            config.store.address(),
            config.store.db,
            config.store.timeout.as_secs()
        );
    }

    let sampler = Sampler::from_config(RealFs::new(), &config);
    debug!("Hostname: {}", sampler.hostname());

    let sink = build_sink(&config);
    let mut scheduler = Scheduler::new(sampler, sink, config.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    if !config.is_single_shot() {
        let r = running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            r.store(false, Ordering::SeqCst);
        }) {
            warn!("Failed to set Ctrl-C handler: {}", e);
        }
    }

    match scheduler.run(&running) {
        Ok(summary) => {
            debug!(
                "Finished after {} ticks ({} failed)",
                summary.ticks, summary.failures
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
