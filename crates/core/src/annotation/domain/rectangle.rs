use crate::detection::domain::pixel_box::PixelBox;
use crate::shared::frame::Frame;

/// Draw a 1-pixel rectangle outline through the box corners, in place.
///
/// Corners may lie outside the frame; only the visible part of each edge
/// is written.
pub fn draw_rectangle(frame: &mut Frame, pixel_box: &PixelBox, color: [u8; 3]) {
    let x0 = pixel_box.xmin.min(pixel_box.xmax) as i64;
    let x1 = pixel_box.xmin.max(pixel_box.xmax) as i64;
    let y0 = pixel_box.ymin.min(pixel_box.ymax) as i64;
    let y1 = pixel_box.ymin.max(pixel_box.ymax) as i64;

    let w = frame.width() as i64;
    let h = frame.height() as i64;
    if w == 0 || h == 0 || x1 < 0 || y1 < 0 || x0 >= w || y0 >= h {
        return;
    }

    // Horizontal edges, restricted to visible columns
    for x in x0.max(0)..=x1.min(w - 1) {
        set_pixel(frame, x, y0, color);
        set_pixel(frame, x, y1, color);
    }
    // Vertical edges, restricted to visible rows
    for y in y0.max(0)..=y1.min(h - 1) {
        set_pixel(frame, x0, y, color);
        set_pixel(frame, x1, y, color);
    }
}

#[inline]
fn set_pixel(frame: &mut Frame, x: i64, y: i64, color: [u8; 3]) {
    let w = frame.width() as i64;
    let h = frame.height() as i64;
    if x < 0 || x >= w || y < 0 || y >= h {
        return;
    }
    let channels = frame.channels() as usize;
    let offset = (y as usize * w as usize + x as usize) * channels;
    let n = channels.min(3);
    frame.data_mut()[offset..offset + n].copy_from_slice(&color[..n]);
}
