//! Human-readable sizes and phase timings

use std::time::{Duration, Instant};

use tracing::Level;

/// Wall-clock time of each phase of a run
pub struct Timings {
    start: Instant,
    last: Instant,
    phases: Vec<(&'static str, Duration)>,
}

impl Timings {
    /// Start the clock
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            phases: Vec::new(),
        }
    }

    /// Close the current phase
    pub fn mark(&mut self, phase: &'static str) {
        let now = Instant::now();
        self.phases.push((phase, now - self.last));
        self.last = now;
    }

    /// Log every phase at debug level
    pub fn report(&self) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        tracing::debug!("Timing stats:");
        for (phase, took) in &self.phases {
            tracing::debug!(" - {phase}: {}", format_duration(*took));
        }
        tracing::debug!("Total: {}", format_duration(self.last - self.start));
    }
}

fn format_unit(units: &[&str], mut value: f64, factor: f64) -> String {
    let mut unit = 0;
    while value >= factor && unit + 1 < units.len() {
        value /= factor;
        unit += 1;
    }
    format!("{value:.2} {}", units[unit])
}

/// Byte count with a binary unit
pub fn format_size(bytes: usize) -> String {
    format_unit(&["B", "kB", "MB", "GB"], bytes as f64, 1024.0)
}

/// Duration in µs, ms or s
pub fn format_duration(duration: Duration) -> String {
    format_unit(&["µs", "ms", "s"], duration.as_secs_f64() * 1e6, 1000.0)
}
