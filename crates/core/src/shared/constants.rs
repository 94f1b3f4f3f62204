pub const DEFAULT_MODEL_PATH: &str = "models/face-detection-retail-0005.onnx";

/// Input resolution of the retail face-detection SSD family, used when the
/// model leaves its spatial dimensions dynamic.
pub const DEFAULT_INPUT_SIZE: usize = 300;

pub const DEFAULT_CONFIDENCE: f32 = 0.5;

pub const DEFAULT_WINDOW_NAME: &str = "Face-Detection_v1";

/// Key code for ESC as reported by the display surface.
pub const STOP_KEY: i32 = 27;

pub const DEFAULT_KEY_DELAY_MS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
