use crate::shared::frame::{Frame, FrameSize};

/// Yields frames from a capture device on demand.
///
/// Implementations convert to BGR before handing frames out.
pub trait FrameSource {
    /// Opens the device and returns its native resolution.
    fn open(&mut self) -> Result<FrameSize, Box<dyn std::error::Error>>;

    /// Returns the newest available frame, or `None` once the stream has ended.
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn release(&mut self);
}
