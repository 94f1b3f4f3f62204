use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::{Frame, FrameSize};
use crate::video::domain::frame_source::FrameSource;

/// Replays still images from a directory as a capture stream.
///
/// Files are played in file-name order. Every image must share the
/// resolution of the first one, which is reported as the native size.
/// Decoding uses the `image` crate; pixels are converted to BGR.
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    next: usize,
    size: Option<FrameSize>,
}

impl ImageSequenceSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            paths: Vec::new(),
            next: 0,
            size: None,
        }
    }

    fn decode(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Ok(Frame::new(data, width, height, 3, index))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<FrameSize, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| format!("No images found in {}", self.dir.display()))?;
        let size = self.decode(first, 0)?.size();

        log::info!(
            "Replaying {} images from {} at {}x{}",
            paths.len(),
            self.dir.display(),
            size.width,
            size.height
        );

        self.paths = paths;
        self.next = 0;
        self.size = Some(size);
        Ok(size)
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let size = self.size.ok_or("image sequence is not open")?;
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };

        let frame = self.decode(path, self.next)?;
        if frame.size() != size {
            return Err(format!(
                "{} is {}x{}, expected {}x{}",
                path.display(),
                frame.width(),
                frame.height(),
                size.width,
                size.height
            )
            .into());
        }
        self.next += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.paths.clear();
        self.size = None;
    }
}
