use opencv::core::Mat;
use opencv::highgui;
use opencv::prelude::*;

use crate::shared::frame::Frame;
use crate::video::domain::display_surface::DisplaySurface;

/// Named HighGUI window.
pub struct OpenCvWindow {
    name: String,
    open: bool,
}

impl OpenCvWindow {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            open: false,
        }
    }
}

/// Copies a BGR frame into an owned 8UC3 `Mat`.
fn frame_to_mat(frame: &Frame) -> Result<Mat, Box<dyn std::error::Error>> {
    if frame.channels() != 3 {
        return Err(format!("cannot display a {}-channel frame", frame.channels()).into());
    }
    let flat = Mat::from_slice(frame.data())?;
    let mat = flat.reshape(3, frame.height() as i32)?.try_clone()?;
    Ok(mat)
}

impl DisplaySurface for OpenCvWindow {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        highgui::named_window(&self.name, highgui::WINDOW_AUTOSIZE)?;
        self.open = true;
        Ok(())
    }

    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mat = frame_to_mat(frame)?;
        highgui::imshow(&self.name, &mat)?;
        Ok(())
    }

    fn poll_key(&mut self, delay_ms: u64) -> Result<Option<i32>, Box<dyn std::error::Error>> {
        let key = highgui::wait_key(delay_ms.min(i32::MAX as u64) as i32)?;
        Ok((key >= 0).then_some(key & 0xFF))
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = highgui::destroy_window(&self.name) {
            log::warn!("Failed to close window '{}': {e}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC3};

    #[test]
    fn test_frame_to_mat_keeps_layout() {
        // 2x2 BGR, pixel (row=1, col=0) is pure red
        let mut data = vec![0u8; 12];
        data[8] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);

        let mat = frame_to_mat(&frame).unwrap();
        assert_eq!(mat.rows(), 2);
        assert_eq!(mat.cols(), 2);
        assert_eq!(mat.typ(), CV_8UC3);
        assert_eq!(mat.at_2d::<Vec3b>(1, 0).unwrap().0, [0, 0, 255]);
        assert_eq!(mat.at_2d::<Vec3b>(0, 1).unwrap().0, [0, 0, 0]);
    }

    #[test]
    fn test_frame_to_mat_rejects_non_bgr() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(frame_to_mat(&frame).is_err());
    }
}
