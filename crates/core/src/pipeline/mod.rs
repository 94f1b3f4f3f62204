pub mod frame_loop;
pub mod pipeline_config;
pub mod pipeline_logger;
