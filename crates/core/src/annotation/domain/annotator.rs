use crate::detection::domain::pixel_box::PixelBox;
use crate::shared::frame::Frame;

use super::box_color::BoxColor;
use super::rectangle::draw_rectangle;

/// Outcome of annotating one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// True when `count` differs from the previous frame's count.
    pub count_changed: bool,
    pub count: usize,
}

/// Draws detection boxes and tracks how many faces the previous frame had.
///
/// The previous count starts at 0 and lives as long as the annotator, so a
/// fresh instance behaves like a fresh process.
#[derive(Debug, Default)]
pub struct Annotator {
    previous_count: usize,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_count(&self) -> usize {
        self.previous_count
    }

    /// Draw every box onto `frame` in place and update the count signal.
    pub fn annotate(&mut self, frame: &mut Frame, boxes: &[PixelBox], color: BoxColor) -> Annotation {
        let bgr = color.bgr();
        for pixel_box in boxes {
            draw_rectangle(frame, pixel_box, bgr);
        }
        self.record_count(boxes.len())
    }

    /// Update the count signal without drawing.
    pub fn record_count(&mut self, count: usize) -> Annotation {
        let count_changed = count != self.previous_count;
        if count_changed {
            self.previous_count = count;
        }
        Annotation {
            count_changed,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Frame {
        Frame::new(vec![0u8; 20 * 20 * 3], 20, 20, 3, 0)
    }

    fn boxes(n: usize) -> Vec<PixelBox> {
        (0..n)
            .map(|i| PixelBox {
                xmin: i as i32,
                ymin: i as i32,
                xmax: i as i32 + 5,
                ymax: i as i32 + 5,
                confidence: 0.9,
            })
            .collect()
    }

    #[test]
    fn test_change_signal_fires_only_on_count_changes() {
        let mut annotator = Annotator::new();
        let counts = [0, 0, 2, 2, 1];
        let fired: Vec<usize> = counts
            .iter()
            .enumerate()
            .filter_map(|(i, &n)| {
                let mut frame = blank();
                let a = annotator.annotate(&mut frame, &boxes(n), BoxColor::Red);
                assert_eq!(a.count, n);
                a.count_changed.then_some(i)
            })
            .collect();
        assert_eq!(fired, vec![2, 4]);
        assert_eq!(annotator.previous_count(), 1);
    }

    #[test]
    fn test_starts_at_zero() {
        let mut annotator = Annotator::new();
        assert_eq!(annotator.previous_count(), 0);
        assert!(!annotator.record_count(0).count_changed);
    }

    #[test]
    fn test_record_count_shares_state_with_annotate() {
        let mut annotator = Annotator::new();
        let mut frame = blank();
        assert!(annotator.annotate(&mut frame, &boxes(3), BoxColor::Green).count_changed);
        // A failed frame counts as zero faces
        assert!(annotator.record_count(0).count_changed);
        assert!(annotator.annotate(&mut frame, &boxes(3), BoxColor::Green).count_changed);
    }

    #[test]
    fn test_draws_in_selected_color() {
        let mut annotator = Annotator::new();
        let mut frame = blank();
        annotator.annotate(&mut frame, &boxes(1), BoxColor::Blue);
        let arr = frame.as_ndarray();
        assert_eq!([arr[[0, 0, 0]], arr[[0, 0, 1]], arr[[0, 0, 2]]], [255, 0, 0]);
    }

    #[test]
    fn test_no_boxes_leaves_frame_untouched() {
        let mut annotator = Annotator::new();
        let mut frame = blank();
        let before = frame.data().to_vec();
        annotator.annotate(&mut frame, &[], BoxColor::Red);
        assert_eq!(frame.data(), &before[..]);
    }
}
