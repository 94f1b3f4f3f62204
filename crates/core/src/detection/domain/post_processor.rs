use super::pixel_box::PixelBox;
use super::raw_detection::RawDetection;

/// Keep detections at or above `confidence_threshold` and map their
/// normalized boxes onto a `frame_width` x `frame_height` frame.
///
/// Input order is preserved. Coordinates are rounded to the nearest pixel
/// and deliberately left unclipped.
pub fn postprocess(
    raw_detections: &[RawDetection],
    confidence_threshold: f32,
    frame_width: u32,
    frame_height: u32,
) -> Vec<PixelBox> {
    let fw = frame_width as f32;
    let fh = frame_height as f32;

    raw_detections
        .iter()
        .filter(|det| det.confidence >= confidence_threshold)
        .map(|det| PixelBox {
            xmin: denormalize(det.xmin, fw),
            ymin: denormalize(det.ymin, fh),
            xmax: denormalize(det.xmax, fw),
            ymax: denormalize(det.ymax, fh),
            confidence: det.confidence,
        })
        .collect()
}

fn denormalize(value: f32, dimension: f32) -> i32 {
    (value * dimension).round() as i32
}
