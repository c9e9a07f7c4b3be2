use std::collections::HashMap;
use std::time::Instant;

/// Observer for frame-loop events: tick progress, stage timings, metrics.
///
/// Keeps the loop free of any particular output mechanism.
pub trait LoopLogger: Send {
    /// Called after each completed tick with the number of ticks so far.
    fn progress(&mut self, ticks: usize);

    /// Record how long a named stage (`detect`, `classify`, `render`) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric such as the number of hands seen.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullLoopLogger;

impl LoopLogger for NullLoopLogger {
    fn progress(&mut self, _ticks: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running count and sum of a recorded series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStat {
    pub count: usize,
    pub sum: f64,
}

impl RunningStat {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// CLI logger: aggregates per-stage timings and metrics and reports a summary
/// with throughput when the loop ends.
///
/// Only one `RunningStat` is kept per stage or metric name, so a camera run
/// of any length holds a fixed amount of state. Progress lines are throttled
/// to one every `throttle_ticks` ticks.
pub struct StdoutLoopLogger {
    throttle_ticks: usize,
    timings: HashMap<String, RunningStat>,
    metrics: HashMap<String, RunningStat>,
    start_time: Instant,
    ticks: usize,
}

impl StdoutLoopLogger {
    pub fn new(throttle_ticks: usize) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
        }
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let ticks = self.ticks;
        let mut lines = Vec::new();

        lines.push(format!(
            "Loop summary ({ticks} ticks, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let stat = self.timings[stage];
            let total_ms = stat.sum;
            let avg_ms = stat.mean();
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", self.metrics[name].mean()));
        }

        if ticks > 0 && elapsed_ms > 0.0 {
            let fps = ticks as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_stat(&self, stage: &str) -> Option<RunningStat> {
        self.timings.get(stage).copied()
    }

    pub fn metric_stat(&self, name: &str) -> Option<RunningStat> {
        self.metrics.get(name).copied()
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

impl Default for StdoutLoopLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl LoopLogger for StdoutLoopLogger {
    fn progress(&mut self, ticks: usize) {
        self.ticks = ticks;
        if ticks % self.throttle_ticks == 0 {
            log::info!("Processed {ticks} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        match self.timings.get_mut(stage) {
            Some(stat) => stat.record(duration_ms),
            None => {
                let mut stat = RunningStat::default();
                stat.record(duration_ms);
                self.timings.insert(stage.to_string(), stat);
            }
        }
    }

    fn metric(&mut self, name: &str, value: f64) {
        match self.metrics.get_mut(name) {
            Some(stat) => stat.record(value),
            None => {
                let mut stat = RunningStat::default();
                stat.record(value);
                self.metrics.insert(name.to_string(), stat);
            }
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullLoopLogger;
        logger.progress(1);
        logger.timing("detect", 5.0);
        logger.metric("hands", 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_aggregates_per_stage() {
        let mut logger = StdoutLoopLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("render", 5.0);

        let detect = logger.timing_stat("detect").unwrap();
        assert_eq!(detect.count, 2);
        assert_relative_eq!(detect.sum, 50.0);
        assert_relative_eq!(detect.mean(), 25.0);
        assert_eq!(logger.timing_stat("render").unwrap().count, 1);
        assert!(logger.timing_stat("classify").is_none());
    }

    #[test]
    fn test_long_run_keeps_one_entry_per_name() {
        let mut logger = StdoutLoopLogger::new(1000);
        for i in 1..=100_000 {
            logger.timing("detect", (i % 10) as f64);
            logger.metric("hands", (i % 2) as f64);
            logger.info("tick");
            logger.progress(i);
        }

        assert_eq!(logger.timings.len(), 1);
        assert_eq!(logger.metrics.len(), 1);
        let detect = logger.timing_stat("detect").unwrap();
        assert_eq!(detect.count, 100_000);
        assert_relative_eq!(detect.mean(), 4.5);
        assert_relative_eq!(logger.metric_stat("hands").unwrap().mean(), 0.5);
        assert_eq!(logger.ticks(), 100_000);
    }

    #[test]
    fn test_metric_average_in_summary() {
        let mut logger = StdoutLoopLogger::new(10);
        logger.progress(2);
        logger.metric("hands", 0.0);
        logger.metric("hands", 1.0);

        assert_relative_eq!(logger.metric_stat("hands").unwrap().mean(), 0.5);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("hands: avg 0.5"));
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = StdoutLoopLogger::new(10);
        logger.progress(100);
        logger.timing("detect", 10.0);
        logger.timing("render", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Loop summary (100 ticks"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("render"));
        assert!(summary.contains("Throughput"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(StdoutLoopLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_empty_stat_mean_is_zero() {
        assert_eq!(RunningStat::default().mean(), 0.0);
    }

    #[test]
    fn test_progress_tracks_latest_tick() {
        let mut logger = StdoutLoopLogger::new(10);
        for i in 1..=25 {
            logger.progress(i);
        }
        assert_eq!(logger.ticks(), 25);
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        let logger = StdoutLoopLogger::new(0);
        assert_eq!(logger.throttle_ticks, 1);
        assert_eq!(StdoutLoopLogger::default().throttle_ticks, 30);
    }
}
