/// SSD face detector backend using ONNX Runtime via `ort`.
///
/// Expects a single NCHW image input and a `[1, 1, N, 7]` detection output,
/// the layout of the retail face-detection model family.
use std::path::Path;

use crate::detection::domain::inference_session::{
    InferenceBackend, InferenceError, InputShape, Tensor,
};
use crate::detection::domain::raw_detection::{parse_detections, RawDetection};
use crate::shared::constants::DEFAULT_INPUT_SIZE;

use super::execution_provider::ComputeDevice;

pub struct OnnxSsdBackend {
    session: ort::session::Session,
    input_shape: InputShape,
}

impl OnnxSsdBackend {
    /// Load an ONNX model and bind it to `device`.
    ///
    /// The input resolution is read from the model's input shape (NCHW).
    /// Dynamic or unreadable dimensions fall back to 300x300.
    pub fn new(model_path: &Path, device: ComputeDevice) -> Result<Self, InferenceError> {
        let session =
            build_session(model_path, device).map_err(|e| InferenceError::ModelLoad {
                path: model_path.display().to_string(),
                message: e.to_string(),
            })?;

        let dims: Option<Vec<i64>> = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                Some(shape.iter().copied().collect())
            } else {
                None
            }
        });
        let input_shape = input_shape_from_dims(dims.as_deref());

        log::info!(
            "Loaded {} on {device}, input {:?}",
            model_path.display(),
            input_shape.as_tuple()
        );

        Ok(Self {
            session,
            input_shape,
        })
    }
}

fn build_session(
    model_path: &Path,
    device: ComputeDevice,
) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    let builder = ort::session::Session::builder()?;
    let providers = device.execution_providers();
    let builder = if providers.is_empty() {
        builder
    } else {
        builder.with_execution_providers(providers)?
    };
    Ok(builder.commit_from_file(model_path)?)
}

/// Resolve `[N, C, H, W]` model dimensions, replacing dynamic (`<= 0`)
/// spatial sizes with the default input size.
fn input_shape_from_dims(dims: Option<&[i64]>) -> InputShape {
    let dim = |i: usize, fallback: usize| {
        dims.and_then(|d| d.get(i))
            .filter(|&&v| v > 0)
            .map(|&v| v as usize)
            .unwrap_or(fallback)
    };
    InputShape {
        batch: 1,
        channels: dim(1, 3),
        height: dim(2, DEFAULT_INPUT_SIZE),
        width: dim(3, DEFAULT_INPUT_SIZE),
    }
}

impl InferenceBackend for OnnxSsdBackend {
    fn input_shape(&self) -> InputShape {
        self.input_shape
    }

    fn infer(&mut self, tensor: Tensor) -> Result<Vec<RawDetection>, InferenceError> {
        let (n, c, h, w) = self.input_shape.as_tuple();
        if tensor.shape() != &[n, c, h, w] {
            return Err(InferenceError::ShapeMismatch {
                expected: self.input_shape.as_tuple(),
                actual: tensor.shape().to_vec(),
            });
        }

        let backend_err = |e: ort::Error| InferenceError::Backend(e.to_string());

        let input_value = ort::value::Tensor::from_array(tensor).map_err(backend_err)?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(backend_err)?;
        if outputs.len() == 0 {
            return Err(InferenceError::Backend(
                "model produced no outputs".to_string(),
            ));
        }
        let output = outputs[0].try_extract_array::<f32>().map_err(backend_err)?;
        let data = output
            .as_slice()
            .ok_or_else(|| InferenceError::Backend("output tensor is not contiguous".to_string()))?;

        Ok(parse_detections(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_dims_are_used() {
        let shape = input_shape_from_dims(Some(&[1, 3, 384, 672]));
        assert_eq!(shape.as_tuple(), (1, 3, 384, 672));
    }

    #[test]
    fn test_dynamic_dims_fall_back() {
        let shape = input_shape_from_dims(Some(&[-1, 3, -1, -1]));
        assert_eq!(
            shape.as_tuple(),
            (1, 3, DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE)
        );
    }

    #[test]
    fn test_missing_dims_fall_back() {
        let shape = input_shape_from_dims(None);
        assert_eq!(
            shape.as_tuple(),
            (1, 3, DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE)
        );
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let result = OnnxSsdBackend::new(Path::new("/nonexistent/model.onnx"), ComputeDevice::Cpu);
        assert!(matches!(result, Err(InferenceError::ModelLoad { .. })));
    }
}
