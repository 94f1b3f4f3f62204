use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for frame-loop events.
///
/// Decouples the loop from specific output mechanisms so callers can swap
/// in their own telemetry without touching the orchestration code.
pub trait PipelineLogger {
    /// Called once per processed frame.
    fn frame_processed(&mut self, frame_index: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// The number of detected faces differs from the previous frame.
    fn detection_count_changed(&mut self, count: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame_processed(&mut self, _frame_index: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn detection_count_changed(&mut self, _count: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// Formats the count-change telemetry line.
pub fn detection_count_message(count: usize) -> String {
    format!("{count} face(s) detected.")
}

/// Running totals for one named stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTiming {
    pub count: usize,
    pub total_ms: f64,
}

impl StageTiming {
    pub fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

/// CLI-oriented logger that reports count changes, tracks per-stage
/// timing, and provides a summary report when the loop stops.
///
/// Memory stays constant however long the stream runs. Frame progress is
/// throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, StageTiming>,
    start_time: Instant,
    total_frames: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            total_frames: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if no frame was processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.total_frames == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.total_frames;
        let mut lines = Vec::new();

        lines.push(format!(
            "Run summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, timing) in stages {
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  total {:7.0}ms",
                timing.avg_ms(),
                timing.total_ms
            ));
        }

        if elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the accumulated timing for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<StageTiming> {
        self.timings.get(stage).copied()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame_processed(&mut self, frame_index: usize) {
        self.total_frames += 1;
        if self.total_frames % self.throttle_frames == 0 {
            log::debug!("Processed {} frames (last index {frame_index})", self.total_frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.timings.entry(stage.to_string()).or_default();
        entry.count += 1;
        entry.total_ms += duration_ms;
    }

    fn detection_count_changed(&mut self, count: usize) {
        log::info!("{}", detection_count_message(count));
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
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.frame_processed(0);
        logger.timing("inference", 5.0);
        logger.detection_count_changed(2);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_detection_count_message_format() {
        assert_eq!(detection_count_message(0), "0 face(s) detected.");
        assert_eq!(detection_count_message(3), "3 face(s) detected.");
    }

    #[test]
    fn test_timing_accumulates_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("inference", 20.0);
        logger.timing("inference", 30.0);
        logger.timing("preprocess", 5.0);

        let inference = logger.timings_for("inference").unwrap();
        assert_eq!(inference.count, 2);
        assert_relative_eq!(inference.total_ms, 50.0);
        assert_relative_eq!(inference.avg_ms(), 25.0);
        assert_eq!(logger.timings_for("preprocess").unwrap().count, 1);
        assert!(logger.timings_for("annotate").is_none());
    }

    #[test]
    fn test_long_stream_keeps_one_entry_per_stage() {
        let mut logger = StdoutPipelineLogger::new(1000);
        for i in 0..100_000 {
            logger.frame_processed(i);
            logger.timing("preprocess", 1.0);
            logger.timing("inference", 2.0);
            logger.timing("annotate", 0.5);
            if i % 2 == 0 {
                logger.detection_count_changed(i % 3);
            }
        }
        assert_eq!(logger.timings.len(), 3);
        let inference = logger.timings_for("inference").unwrap();
        assert_eq!(inference.count, 100_000);
        assert_relative_eq!(inference.avg_ms(), 2.0);
        assert_eq!(logger.total_frames, 100_000);
    }

    #[test]
    fn test_count_change_and_info_are_not_buffered() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.detection_count_changed(2);
        logger.info("hello");
        assert!(logger.timings.is_empty());
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_empty_stage_average_is_zero() {
        assert_eq!(StageTiming::default().avg_ms(), 0.0);
    }

    #[test]
    fn test_summary_includes_stages_and_fps() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 0..5 {
            logger.frame_processed(i);
        }
        logger.timing("inference", 10.0);
        logger.timing("annotate", 1.0);
        std::thread::sleep(std::time::Duration::from_millis(2));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Run summary (5 frames"));
        assert!(summary.contains("inference"));
        assert!(summary.contains("annotate"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_frame_processed_counts_frames() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 0..20 {
            logger.frame_processed(i);
        }
        assert_eq!(logger.total_frames, 20);
    }

    #[test]
    fn test_default_throttle() {
        let logger = StdoutPipelineLogger::default();
        assert_eq!(logger.throttle_frames, 100);
    }
}
