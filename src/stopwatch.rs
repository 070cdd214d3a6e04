use std::time::{Duration, Instant};

/// Monotonic wall-clock stopwatch for a single quiz run.
///
/// `start` is idempotent: the first call records the baseline and later calls
/// are ignored until `reset`. `stop` freezes the elapsed value so the final
/// time can be re-read after the run ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    frozen: Option<Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.frozen = None;
        }
    }

    /// Freeze the elapsed value. No-op when not running.
    pub fn stop(&mut self) {
        if self.frozen.is_none() {
            if let Some(started_at) = self.started_at {
                self.frozen = Some(started_at.elapsed());
            }
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.frozen = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Elapsed time since `start`, the frozen value after `stop`, or zero
    /// before the first `start`.
    pub fn elapsed_now(&self) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        match self.started_at {
            Some(started_at) => started_at.elapsed(),
            None => Duration::ZERO,
        }
    }
}

/// Render a duration as seconds with exactly three fractional digits,
/// e.g. 12345 ms -> "12.345 s"
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3} s", elapsed.as_secs_f64())
}
