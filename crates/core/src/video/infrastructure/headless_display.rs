use crate::shared::frame::Frame;
use crate::video::domain::display_surface::DisplaySurface;

/// Display surface for runs without a window.
///
/// Frames are counted and dropped; no key is ever reported, so the loop
/// ends on stream end or an external stop signal.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    frames_shown: usize,
    open: bool,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.open = true;
        Ok(())
    }

    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.open {
            return Err("headless display is not open".into());
        }
        self.frames_shown += 1;
        log::trace!("Frame {} ({}x{})", frame.index(), frame.width(), frame.height());
        Ok(())
    }

    fn poll_key(&mut self, _delay_ms: u64) -> Result<Option<i32>, Box<dyn std::error::Error>> {
        Ok(None)
    }

    fn close(&mut self) {
        if self.open {
            log::debug!("Headless display closed after {} frames", self.frames_shown);
        }
        self.open = false;
    }
}
