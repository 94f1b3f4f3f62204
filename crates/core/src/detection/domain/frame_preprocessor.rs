use ndarray::Array4;
use thiserror::Error;

use crate::shared::frame::Frame;

use super::inference_session::Tensor;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("target size must be non-zero, got {width}x{height}")]
    ZeroTarget { width: usize, height: usize },
    #[error("expected a 3-channel frame, got {0} channels")]
    UnsupportedChannels(u8),
}

/// Resize a BGR frame to `target_width` x `target_height` and lay it out as
/// a `[1, 3, H, W]` tensor.
///
/// Resizing is bilinear with half-pixel centres, the same sampling grid
/// OpenCV's `INTER_LINEAR` uses. Interpolated values are rounded to the
/// nearest 8-bit level, so the tensor holds exactly what a resized `u8`
/// image would, in channel-first order and without normalization.
pub fn preprocess(
    frame: &Frame,
    target_height: usize,
    target_width: usize,
) -> Result<Tensor, PreprocessError> {
    if frame.is_empty() {
        return Err(PreprocessError::EmptyFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }
    if target_height == 0 || target_width == 0 {
        return Err(PreprocessError::ZeroTarget {
            width: target_width,
            height: target_height,
        });
    }
    if frame.channels() != 3 {
        return Err(PreprocessError::UnsupportedChannels(frame.channels()));
    }

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    let cols = sample_positions(src_w, target_width);
    let rows = sample_positions(src_h, target_height);

    let mut tensor = Array4::<f32>::zeros((1, 3, target_height, target_width));
    for (y, &(y0, y1, fy)) in rows.iter().enumerate() {
        for (x, &(x0, x1, fx)) in cols.iter().enumerate() {
            for c in 0..3 {
                let v00 = src[[y0, x0, c]] as f32;
                let v01 = src[[y0, x1, c]] as f32;
                let v10 = src[[y1, x0, c]] as f32;
                let v11 = src[[y1, x1, c]] as f32;
                let top = v00 + (v01 - v00) * fx;
                let bottom = v10 + (v11 - v10) * fx;
                tensor[[0, c, y, x]] = (top + (bottom - top) * fy).round();
            }
        }
    }

    Ok(tensor)
}

/// For each destination index, the two source neighbours and the weight of
/// the second one.
fn sample_positions(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let last = (src_len - 1) as f32;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f32 + 0.5) * scale - 0.5).clamp(0.0, last);
            let i0 = s.floor() as usize;
            let i1 = (i0 + 1).min(src_len - 1);
            (i0, i1, s - i0 as f32)
        })
        .collect()
}
