pub mod frame_preprocessor;
pub mod inference_session;
pub mod pixel_box;
pub mod post_processor;
pub mod raw_detection;
