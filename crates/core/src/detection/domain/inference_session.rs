use std::time::Duration;

use ndarray::Array4;
use thiserror::Error;

use super::raw_detection::RawDetection;

/// NCHW float32 model input.
pub type Tensor = Array4<f32>;

/// Model input shape as declared by the session: `(batch, channels, height, width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputShape {
    pub batch: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl InputShape {
    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (self.batch, self.channels, self.height, self.width)
    }
}

/// Completion state of the in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InferenceStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("failed to load model from {path}: {message}")]
    ModelLoad { path: String, message: String },
    #[error("unknown compute device '{0}' (expected CPU, GPU or AUTO)")]
    UnknownDevice(String),
    #[error("an inference request is already in flight")]
    RequestInFlight,
    #[error("tensor shape {actual:?} does not match model input {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize, usize),
        actual: Vec<usize>,
    },
    #[error("inference backend failed: {0}")]
    Backend(String),
    #[error("inference worker is no longer running")]
    WorkerDisconnected,
}

/// Boundary to an inference engine that runs one request at a time.
///
/// The frame loop submits a tensor, waits for the request to leave
/// `Pending`, then takes the detections. Submitting while a request is
/// still in flight is rejected.
pub trait InferenceSession {
    fn input_shape(&self) -> InputShape;

    fn submit(&mut self, tensor: Tensor) -> Result<(), InferenceError>;

    /// Non-blocking completion check.
    fn poll(&mut self) -> InferenceStatus;

    /// Takes the completed request out of the session.
    ///
    /// Returns the detections for the most recent submission when it
    /// succeeded, `None` when it failed or nothing has completed. Either way
    /// a completed request no longer counts as in flight afterwards.
    fn take_detections(&mut self) -> Option<Vec<RawDetection>>;

    /// Blocks until the request leaves `Pending`, checking every `poll_interval`.
    fn wait(&mut self, poll_interval: Duration) -> InferenceStatus {
        loop {
            match self.poll() {
                InferenceStatus::Pending => std::thread::sleep(poll_interval),
                status => return status,
            }
        }
    }
}

/// Synchronous inference implementation, driven by a session's worker.
pub trait InferenceBackend: Send {
    fn input_shape(&self) -> InputShape;

    fn infer(&mut self, tensor: Tensor) -> Result<Vec<RawDetection>, InferenceError>;
}
