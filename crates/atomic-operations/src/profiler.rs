use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub duration: Duration,
}

/// Records how long each analysis stage takes. A disabled profiler only runs
/// the closures.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    enabled: bool,
    timings: Vec<StageTiming>,
}

impl Profiler {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let value = f();
        let duration = start.elapsed();
        debug!(stage, elapsed_ms = duration.as_secs_f64() * 1000.0, "stage finished");
        self.timings.push(StageTiming { stage, duration });
        value
    }

    #[must_use]
    pub fn report(&self) -> &[StageTiming] {
        &self.timings
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.timings.iter().map(|t| t.duration).sum()
    }
}
