use crate::shared::frame::Frame;

/// A named window that presents frames and reports key presses.
pub trait DisplaySurface {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Waits up to `delay_ms` for a key press and returns its code, if any.
    fn poll_key(&mut self, delay_ms: u64) -> Result<Option<i32>, Box<dyn std::error::Error>>;

    /// Tears the surface down. Safe to call more than once.
    fn close(&mut self);
}
