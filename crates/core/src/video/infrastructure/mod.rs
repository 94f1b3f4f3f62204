pub mod headless_display;
pub mod image_sequence_source;
#[cfg(feature = "opencv")]
pub mod opencv_camera;
#[cfg(feature = "opencv")]
pub mod opencv_window;
