use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::annotation::domain::box_color::BoxColor;
use crate::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_KEY_DELAY_MS, DEFAULT_POLL_INTERVAL_MS, STOP_KEY,
};

/// Plain-value settings for one frame-loop run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub confidence_threshold: f32,
    pub box_color: BoxColor,
    /// Key code that ends the loop.
    pub stop_key: i32,
    /// How long the display waits for a key after each frame.
    pub key_delay_ms: u64,
    /// Slice length when blocking on an inference result.
    pub poll_interval: Duration,
    /// Set from outside (e.g. a Ctrl-C handler) to stop at the next frame boundary.
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE,
            box_color: BoxColor::FALLBACK,
            stop_key: STOP_KEY,
            key_delay_ms: DEFAULT_KEY_DELAY_MS,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}
