use std::fmt;
use std::str::FromStr;

use crate::detection::domain::inference_session::InferenceError;

/// Where the model runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeDevice {
    Cpu,
    /// The platform's accelerated provider, with CPU fallback.
    Accelerated,
}

impl ComputeDevice {
    pub fn execution_providers(&self) -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
        match self {
            ComputeDevice::Cpu => vec![],
            ComputeDevice::Accelerated => preferred_execution_providers(),
        }
    }
}

impl FromStr for ComputeDevice {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CPU" => Ok(ComputeDevice::Cpu),
            "GPU" | "AUTO" => Ok(ComputeDevice::Accelerated),
            _ => Err(InferenceError::UnknownDevice(s.to_string())),
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "CPU"),
            ComputeDevice::Accelerated => write!(f, "GPU"),
        }
    }
}

/// Return the preferred ONNX execution providers for the current platform.
///
/// Falls back to CPU if the platform-specific provider is unavailable.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
