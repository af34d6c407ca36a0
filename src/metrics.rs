//! Stage timings and row counts for a single prediction run.

use std::time::{Duration, Instant};
use tracing::info;

/// Steps of a prediction run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Locate,
    Load,
    Read,
    Predict,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Locate => "locate",
            Stage::Load => "load",
            Stage::Read => "read",
            Stage::Predict => "predict",
            Stage::Write => "write",
        }
    }
}

/// Metrics collector for one run
pub struct RunMetrics {
    /// Completed stages with their durations
    stages: Vec<(Stage, Duration)>,
    /// Rows read from the test directory
    records: usize,
    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            stages: Vec::with_capacity(5),
            records: 0,
            start_time: Instant::now(),
        }
    }

    /// Run a stage and record how long it took
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.record_stage(stage, started.elapsed());
        result
    }

    pub fn record_stage(&mut self, stage: Stage, duration: Duration) {
        self.stages.push((stage, duration));
    }

    pub fn record_rows(&mut self, records: usize) {
        self.records = records;
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Duration of a stage, if it ran
    pub fn stage_duration(&self, stage: Stage) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
    }

    /// Rows per second across inference only
    pub fn get_throughput(&self) -> f64 {
        match self.stage_duration(Stage::Predict) {
            Some(d) if d.as_secs_f64() > 0.0 => self.records as f64 / d.as_secs_f64(),
            _ => 0.0,
        }
    }

    pub fn total_elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        info!("╔══════════════════════════════════════════════╗");
        info!("║          PREDICTION RUN - SUMMARY            ║");
        info!("╠══════════════════════════════════════════════╣");
        info!(
            "║ Records: {:>8}  │  Throughput: {:>9.1} rows/s ║",
            self.records,
            self.get_throughput()
        );
        info!("╠══════════════════════════════════════════════╣");
        for (stage, duration) in &self.stages {
            info!(
                "║   {:8}: {:>10} μs                       ║",
                stage.as_str(),
                duration.as_micros()
            );
        }
        info!(
            "║   {:8}: {:>10} μs                       ║",
            "total",
            self.total_elapsed().as_micros()
        );
        info!("╚══════════════════════════════════════════════╝");
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
