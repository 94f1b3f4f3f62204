use std::sync::atomic::Ordering;
use std::time::Instant;

use thiserror::Error;

use crate::annotation::domain::annotator::{Annotation, Annotator};
use crate::detection::domain::frame_preprocessor::preprocess;
use crate::detection::domain::inference_session::{InferenceSession, InferenceStatus};
use crate::detection::domain::pixel_box::PixelBox;
use crate::detection::domain::post_processor::postprocess;
use crate::detection::domain::raw_detection::RawDetection;
use crate::shared::frame::{Frame, FrameSize};
use crate::video::domain::display_surface::DisplaySurface;
use crate::video::domain::frame_source::FrameSource;

use super::pipeline_config::PipelineConfig;
use super::pipeline_logger::PipelineLogger;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to open capture source: {0}")]
    SourceOpen(String),
    #[error("failed to open display surface: {0}")]
    DisplayOpen(String),
    #[error("frame loop can only be started once")]
    AlreadyStarted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Capturing,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source had no further frame.
    StreamEnded,
    /// The display reported the configured stop key.
    StopKey,
    /// The external cancel flag was set.
    Interrupted,
    /// The display could not present a frame or report a key.
    DisplayFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_processed: usize,
    pub frames_failed: usize,
    pub stop_reason: StopReason,
}

/// Result of running one frame through detection and annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    /// False when preprocessing, submission or inference failed.
    pub inference_succeeded: bool,
    pub boxes: Vec<PixelBox>,
    pub annotation: Annotation,
}

/// Drives capture → preprocess → infer → post-process → annotate → display,
/// one frame at a time, with at most one inference request in flight.
///
/// Single-use: once stopped, the loop cannot be restarted.
pub struct FrameLoop {
    source: Box<dyn FrameSource>,
    display: Box<dyn DisplaySurface>,
    session: Box<dyn InferenceSession>,
    logger: Box<dyn PipelineLogger>,
    annotator: Annotator,
    config: PipelineConfig,
    state: LoopState,
    frame_size: Option<FrameSize>,
    frames_processed: usize,
    frames_failed: usize,
}

impl FrameLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Box<dyn DisplaySurface>,
        session: Box<dyn InferenceSession>,
        logger: Box<dyn PipelineLogger>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            display,
            session,
            logger,
            annotator: Annotator::new(),
            config,
            state: LoopState::Init,
            frame_size: None,
            frames_processed: 0,
            frames_failed: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run until a stop condition, then release the source and display.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.start()?;

        let stop_reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };

        self.stop();
        self.logger.summary();

        Ok(RunSummary {
            frames_processed: self.frames_processed,
            frames_failed: self.frames_failed,
            stop_reason,
        })
    }

    /// INIT → CAPTURING: open the source and the display.
    pub fn start(&mut self) -> Result<FrameSize, PipelineError> {
        if self.state != LoopState::Init {
            return Err(PipelineError::AlreadyStarted);
        }

        let size = match self.source.open() {
            Ok(size) => size,
            Err(e) => {
                self.state = LoopState::Stopped;
                return Err(PipelineError::SourceOpen(e.to_string()));
            }
        };
        if let Err(e) = self.display.open() {
            self.source.release();
            self.state = LoopState::Stopped;
            return Err(PipelineError::DisplayOpen(e.to_string()));
        }

        let shape = self.session.input_shape();
        self.logger.info(&format!(
            "Capturing at {}x{}, model input {}x{}",
            size.width, size.height, shape.width, shape.height
        ));

        self.frame_size = Some(size);
        self.state = LoopState::Capturing;
        Ok(size)
    }

    /// One CAPTURING iteration. Returns the stop reason once the loop should end.
    pub fn step(&mut self) -> Option<StopReason> {
        if self.state != LoopState::Capturing {
            return Some(StopReason::StreamEnded);
        }
        if self.config.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Interrupted);
        }

        let mut frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.logger.info("No more frames from capture source");
                return Some(StopReason::StreamEnded);
            }
            Err(e) => {
                self.logger.info(&format!("Failed to capture frame: {e}"));
                return Some(StopReason::StreamEnded);
            }
        };

        let outcome = self.process_frame(&mut frame);
        self.frames_processed += 1;
        if !outcome.inference_succeeded {
            self.frames_failed += 1;
        }
        if outcome.annotation.count_changed {
            self.logger.detection_count_changed(outcome.annotation.count);
        }
        self.logger.frame_processed(frame.index());

        if let Err(e) = self.display.show(&frame) {
            log::error!("Failed to display frame {}: {e}", frame.index());
            return Some(StopReason::DisplayFailed);
        }
        match self.display.poll_key(self.config.key_delay_ms) {
            Ok(Some(key)) if key == self.config.stop_key => Some(StopReason::StopKey),
            Ok(_) => None,
            Err(e) => {
                log::error!("Failed to poll display for keys: {e}");
                Some(StopReason::DisplayFailed)
            }
        }
    }

    /// Detect faces in `frame` and draw them onto it in place.
    ///
    /// Any failure along the way leaves the frame untouched and counts as
    /// zero detections for the change signal.
    pub fn process_frame(&mut self, frame: &mut Frame) -> FrameOutcome {
        let size = self.frame_size.unwrap_or_else(|| frame.size());

        let Some(raw) = self.infer(frame) else {
            return FrameOutcome {
                inference_succeeded: false,
                boxes: Vec::new(),
                annotation: self.annotator.record_count(0),
            };
        };

        let started = Instant::now();
        let boxes = postprocess(
            &raw,
            self.config.confidence_threshold,
            size.width,
            size.height,
        );
        let annotation = self
            .annotator
            .annotate(frame, &boxes, self.config.box_color);
        self.logger.timing("annotate", elapsed_ms(started));

        FrameOutcome {
            inference_succeeded: true,
            boxes,
            annotation,
        }
    }

    fn infer(&mut self, frame: &Frame) -> Option<Vec<RawDetection>> {
        let shape = self.session.input_shape();

        let started = Instant::now();
        let tensor = match preprocess(frame, shape.height, shape.width) {
            Ok(tensor) => tensor,
            Err(e) => {
                log::warn!("Skipping detection on frame {}: {e}", frame.index());
                return None;
            }
        };
        self.logger.timing("preprocess", elapsed_ms(started));

        let started = Instant::now();
        if let Err(e) = self.session.submit(tensor) {
            log::warn!("Skipping detection on frame {}: {e}", frame.index());
            return None;
        }
        let status = self.session.wait(self.config.poll_interval);
        let detections = self.session.take_detections();
        self.logger.timing("inference", elapsed_ms(started));

        match (status, detections) {
            (InferenceStatus::Ready, Some(detections)) => Some(detections),
            _ => None,
        }
    }

    /// → STOPPED: release the source and tear down the display. Idempotent.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        if self.state == LoopState::Capturing {
            self.source.release();
            self.display.close();
        }
        self.state = LoopState::Stopped;
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
