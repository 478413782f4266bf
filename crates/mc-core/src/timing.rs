//! Wall-clock timing of the expensive setup steps.
//!
//! Set `MC_TIMING` to have timers report through `tracing` under the
//! `mc::timing` target. Without it a [`Timer`] never reads the clock.

use std::time::{Duration, Instant};

pub const TIMING_ENV_VAR: &str = "MC_TIMING";

pub fn is_enabled() -> bool {
    std::env::var_os(TIMING_ENV_VAR).is_some()
}

#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    started: Option<Instant>,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed time, or `None` when timing is off.
    pub fn stop(self) -> Option<Duration> {
        self.started.map(|t| t.elapsed())
    }

    pub fn stop_and_log(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            tracing::info!(
                target: "mc::timing",
                label,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "step finished"
            );
        }
    }
}
