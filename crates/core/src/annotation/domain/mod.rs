pub mod annotator;
pub mod box_color;
pub mod rectangle;
