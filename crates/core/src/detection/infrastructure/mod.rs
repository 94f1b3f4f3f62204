pub mod execution_provider;
pub mod onnx_ssd_backend;
pub mod threaded_inference_session;
