use opencv::core::{Mat, CV_8UC3};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::shared::frame::{Frame, FrameSize};
use crate::video::domain::frame_source::FrameSource;

/// Live camera capture through OpenCV's `VideoCapture`.
///
/// OpenCV already delivers BGR, so pixels are copied as-is.
pub struct OpenCvCamera {
    device_index: i32,
    capture: Option<VideoCapture>,
    next_index: usize,
}

impl OpenCvCamera {
    pub fn new(device_index: i32) -> Self {
        Self {
            device_index,
            capture: None,
            next_index: 0,
        }
    }
}

/// Copies an 8-bit BGR `Mat` into a `Frame`. Any other pixel type is an error.
fn frame_from_mat(mat: &Mat, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    if mat.typ() != CV_8UC3 {
        return Err(format!("unsupported pixel type {} (expected 8-bit BGR)", mat.typ()).into());
    }

    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let data = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };
    Ok(Frame::new(data, width, height, 3, index))
}

impl FrameSource for OpenCvCamera {
    fn open(&mut self) -> Result<FrameSize, Box<dyn std::error::Error>> {
        let capture = VideoCapture::new(self.device_index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("Failed to open camera {}", self.device_index).into());
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        log::info!("Opened camera {} at {width}x{height}", self.device_index);

        self.capture = Some(capture);
        Ok(FrameSize { width, height })
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let capture = self.capture.as_mut().ok_or("camera is not open")?;
        let mut mat = Mat::default();
        if !capture.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }

        let frame = frame_from_mat(&mat, self.next_index)?;
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Failed to release camera {}: {e}", self.device_index);
            }
        }
    }
}
