use std::io::{self, Stdout, Write};

use crate::sample::Sample;
use crate::sink::{Sink, SinkError};

/// Prints the temperature (with a `℃` suffix) and the uptime text, one per line.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&mut self, sample: &Sample) -> Result<(), SinkError> {
        writeln!(self.out, "{}℃", sample.temperature_text())?;
        if let Some(ref uptime) = sample.uptime {
            writeln!(self.out, "{}", uptime)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
