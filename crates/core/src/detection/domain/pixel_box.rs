/// A detection denormalized to pixel coordinates of the captured frame.
///
/// Coordinates are not clipped: a box reaching past the frame edge keeps
/// its out-of-range corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
    pub confidence: f32,
}

