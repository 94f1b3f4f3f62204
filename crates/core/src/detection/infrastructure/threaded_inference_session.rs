use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::detection::domain::inference_session::{
    InferenceBackend, InferenceError, InferenceSession, InferenceStatus, InputShape, Tensor,
};
use crate::detection::domain::raw_detection::RawDetection;

type InferenceResult = Result<Vec<RawDetection>, InferenceError>;

/// Runs a synchronous [`InferenceBackend`] on a dedicated worker thread.
///
/// Layout: `caller → request channel → worker [backend.infer] → result channel → caller`
///
/// Both channels hold a single slot and `submit` refuses a second request
/// until the first has been taken, so at most one request is ever in flight.
pub struct ThreadedInferenceSession {
    input_shape: InputShape,
    request_tx: Option<Sender<Tensor>>,
    result_rx: Receiver<InferenceResult>,
    in_flight: bool,
    completed: Option<InferenceResult>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedInferenceSession {
    pub fn new<B: InferenceBackend + 'static>(backend: B) -> Self {
        let input_shape = backend.input_shape();
        let (request_tx, request_rx) = crossbeam_channel::bounded::<Tensor>(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<InferenceResult>(1);
        let worker = spawn_worker(backend, request_rx, result_tx);

        Self {
            input_shape,
            request_tx: Some(request_tx),
            result_rx,
            in_flight: false,
            completed: None,
            worker: Some(worker),
        }
    }

    fn status_of_completed(&self) -> Option<InferenceStatus> {
        self.completed.as_ref().map(|result| match result {
            Ok(_) => InferenceStatus::Ready,
            Err(_) => InferenceStatus::Failed,
        })
    }
}

fn spawn_worker<B: InferenceBackend + 'static>(
    mut backend: B,
    request_rx: Receiver<Tensor>,
    result_tx: Sender<InferenceResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for tensor in request_rx {
            let result = backend.infer(tensor);
            if let Err(ref e) = result {
                log::warn!("Inference failed: {e}");
            }
            if result_tx.send(result).is_err() {
                break;
            }
        }
    })
}

impl InferenceSession for ThreadedInferenceSession {
    fn input_shape(&self) -> InputShape {
        self.input_shape
    }

    fn submit(&mut self, tensor: Tensor) -> Result<(), InferenceError> {
        if self.in_flight {
            return Err(InferenceError::RequestInFlight);
        }
        let tx = self
            .request_tx
            .as_ref()
            .ok_or(InferenceError::WorkerDisconnected)?;
        tx.send(tensor)
            .map_err(|_| InferenceError::WorkerDisconnected)?;
        self.in_flight = true;
        Ok(())
    }

    fn poll(&mut self) -> InferenceStatus {
        if let Some(status) = self.status_of_completed() {
            return status;
        }
        if !self.in_flight {
            // Nothing was submitted, so nothing can become ready.
            return InferenceStatus::Failed;
        }
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.completed = Some(result);
                self.status_of_completed().unwrap_or(InferenceStatus::Failed)
            }
            Err(TryRecvError::Empty) => InferenceStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                self.completed = Some(Err(InferenceError::WorkerDisconnected));
                InferenceStatus::Failed
            }
        }
    }

    fn take_detections(&mut self) -> Option<Vec<RawDetection>> {
        let completed = self.completed.take()?;
        self.in_flight = false;
        completed.ok()
    }

    /// Blocks on the result channel in `poll_interval` slices instead of
    /// sleeping between polls.
    fn wait(&mut self, poll_interval: Duration) -> InferenceStatus {
        loop {
            if let Some(status) = self.status_of_completed() {
                return status;
            }
            if !self.in_flight {
                return InferenceStatus::Failed;
            }
            match self.result_rx.recv_timeout(poll_interval) {
                Ok(result) => self.completed = Some(result),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.completed = Some(Err(InferenceError::WorkerDisconnected));
                }
            }
        }
    }
}

impl Drop for ThreadedInferenceSession {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Inference worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn shape() -> InputShape {
        InputShape {
            batch: 1,
            channels: 3,
            height: 4,
            width: 4,
        }
    }

    fn tensor() -> Tensor {
        Tensor::zeros((1, 3, 4, 4))
    }

    fn detection(confidence: f32) -> RawDetection {
        RawDetection {
            batch_id: 0.0,
            class_id: 1.0,
            confidence,
            xmin: 0.1,
            ymin: 0.1,
            xmax: 0.5,
            ymax: 0.5,
        }
    }

    /// Returns scripted results in order and records the tensors it saw.
    struct ScriptedBackend {
        results: Vec<InferenceResult>,
        seen: Arc<Mutex<Vec<Vec<usize>>>>,
        delay: Duration,
    }

    impl ScriptedBackend {
        fn new(results: Vec<InferenceResult>) -> Self {
            Self {
                results,
                seen: Arc::new(Mutex::new(Vec::new())),
                delay: Duration::ZERO,
            }
        }
    }

    impl InferenceBackend for ScriptedBackend {
        fn input_shape(&self) -> InputShape {
            shape()
        }

        fn infer(&mut self, tensor: Tensor) -> InferenceResult {
            std::thread::sleep(self.delay);
            self.seen.lock().unwrap().push(tensor.shape().to_vec());
            if self.results.is_empty() {
                Ok(Vec::new())
            } else {
                self.results.remove(0)
            }
        }
    }

    struct PanickingBackend;

    impl InferenceBackend for PanickingBackend {
        fn input_shape(&self) -> InputShape {
            shape()
        }

        fn infer(&mut self, _tensor: Tensor) -> InferenceResult {
            panic!("backend crashed");
        }
    }

    #[test]
    fn test_exposes_backend_input_shape() {
        let session = ThreadedInferenceSession::new(ScriptedBackend::new(vec![]));
        assert_eq!(session.input_shape(), shape());
    }

    #[test]
    fn test_submit_wait_take_returns_detections() {
        let backend = ScriptedBackend::new(vec![Ok(vec![detection(0.9)])]);
        let seen = backend.seen.clone();
        let mut session = ThreadedInferenceSession::new(backend);

        session.submit(tensor()).unwrap();
        assert_eq!(
            session.wait(Duration::from_millis(1)),
            InferenceStatus::Ready
        );
        let dets = session.take_detections().unwrap();
        assert_eq!(dets, vec![detection(0.9)]);
        assert_eq!(seen.lock().unwrap().as_slice(), &[vec![1usize, 3, 4, 4]]);
    }

    #[test]
    fn test_second_submit_while_in_flight_is_rejected() {
        let mut backend = ScriptedBackend::new(vec![]);
        backend.delay = Duration::from_millis(20);
        let mut session = ThreadedInferenceSession::new(backend);

        session.submit(tensor()).unwrap();
        assert_eq!(
            session.submit(tensor()),
            Err(InferenceError::RequestInFlight)
        );

        session.wait(Duration::from_millis(1));
        session.take_detections();
        assert!(session.submit(tensor()).is_ok());
    }

    #[test]
    fn test_poll_reports_pending_then_ready() {
        let mut backend = ScriptedBackend::new(vec![Ok(vec![])]);
        backend.delay = Duration::from_millis(50);
        let mut session = ThreadedInferenceSession::new(backend);

        session.submit(tensor()).unwrap();
        assert_eq!(session.poll(), InferenceStatus::Pending);
        assert_eq!(
            session.wait(Duration::from_millis(5)),
            InferenceStatus::Ready
        );
        // Status stays Ready until the result is taken.
        assert_eq!(session.poll(), InferenceStatus::Ready);
        assert_eq!(session.take_detections(), Some(vec![]));
    }

    #[test]
    fn test_backend_error_is_failed_and_recoverable() {
        let backend = ScriptedBackend::new(vec![
            Err(InferenceError::Backend("boom".into())),
            Ok(vec![detection(0.7)]),
        ]);
        let mut session = ThreadedInferenceSession::new(backend);

        session.submit(tensor()).unwrap();
        assert_eq!(
            session.wait(Duration::from_millis(1)),
            InferenceStatus::Failed
        );
        assert_eq!(session.take_detections(), None);

        session.submit(tensor()).unwrap();
        assert_eq!(
            session.wait(Duration::from_millis(1)),
            InferenceStatus::Ready
        );
        assert_eq!(session.take_detections(), Some(vec![detection(0.7)]));
    }

    #[test]
    fn test_poll_without_submission_is_failed() {
        let mut session = ThreadedInferenceSession::new(ScriptedBackend::new(vec![]));
        assert_eq!(session.poll(), InferenceStatus::Failed);
        assert_eq!(session.take_detections(), None);
    }

    #[test]
    fn test_worker_panic_reports_failed() {
        let mut session = ThreadedInferenceSession::new(PanickingBackend);
        session.submit(tensor()).unwrap();
        assert_eq!(
            session.wait(Duration::from_millis(1)),
            InferenceStatus::Failed
        );
        assert_eq!(session.take_detections(), None);
        assert_eq!(
            session.submit(tensor()),
            Err(InferenceError::WorkerDisconnected)
        );
    }
}
