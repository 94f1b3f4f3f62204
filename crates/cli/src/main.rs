use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;

use facecam_core::annotation::domain::box_color::BoxColor;
use facecam_core::detection::domain::inference_session::InferenceSession;
use facecam_core::detection::infrastructure::execution_provider::ComputeDevice;
use facecam_core::detection::infrastructure::onnx_ssd_backend::OnnxSsdBackend;
use facecam_core::detection::infrastructure::threaded_inference_session::ThreadedInferenceSession;
use facecam_core::pipeline::frame_loop::{FrameLoop, StopReason};
use facecam_core::pipeline::pipeline_config::PipelineConfig;
use facecam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecam_core::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_KEY_DELAY_MS, DEFAULT_MODEL_PATH, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WINDOW_NAME,
};
use facecam_core::video::domain::display_surface::DisplaySurface;
use facecam_core::video::domain::frame_source::FrameSource;
use facecam_core::video::infrastructure::headless_display::HeadlessDisplay;
use facecam_core::video::infrastructure::image_sequence_source::ImageSequenceSource;
#[cfg(feature = "opencv")]
use facecam_core::video::infrastructure::opencv_camera::OpenCvCamera;
#[cfg(feature = "opencv")]
use facecam_core::video::infrastructure::opencv_window::OpenCvWindow;

/// Live face detection on a camera stream. Press ESC to quit.
#[derive(Parser, Debug)]
#[command(name = "facecam")]
struct Cli {
    /// Path to the SSD face detection model (.onnx).
    #[arg(short = 'm', long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Compute device: CPU, GPU or AUTO.
    #[arg(short = 'd', long, default_value = "CPU")]
    device: String,

    /// Box colour: RED, GREEN or BLUE (unknown names fall back to RED).
    #[arg(short = 'c', long, default_value = "RED")]
    color: String,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(short = 't', long, default_value_t = DEFAULT_CONFIDENCE)]
    threshold: f32,

    /// Camera device index.
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Replay images from this directory instead of opening a camera.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Run without a window.
    #[arg(long)]
    headless: bool,

    /// Window title.
    #[arg(long, default_value = DEFAULT_WINDOW_NAME)]
    window: String,

    /// Milliseconds to wait for a key press after each frame.
    #[arg(long, default_value_t = DEFAULT_KEY_DELAY_MS)]
    key_delay_ms: u64,

    /// Milliseconds between inference completion checks.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli);
    let cancelled = config.cancelled.clone();
    ctrlc::set_handler(move || {
        cancelled.store(true, Ordering::Relaxed);
    })?;

    let session = build_session(&cli)?;
    let source = build_source(&cli)?;
    let display = build_display(&cli);

    let mut frame_loop = FrameLoop::new(
        source,
        display,
        session,
        Box::new(StdoutPipelineLogger::default()),
        config,
    );
    let summary = frame_loop.run()?;

    let reason = match summary.stop_reason {
        StopReason::StreamEnded => "capture stream ended",
        StopReason::StopKey => "stop key pressed",
        StopReason::Interrupted => "interrupted",
        StopReason::DisplayFailed => "display failed",
    };
    log::info!(
        "Stopped ({reason}) after {} frames, {} without detection results",
        summary.frames_processed,
        summary.frames_failed
    );
    Ok(())
}

fn build_config(cli: &Cli) -> PipelineConfig {
    PipelineConfig {
        confidence_threshold: cli.threshold,
        box_color: BoxColor::from_name(&cli.color),
        key_delay_ms: cli.key_delay_ms,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        ..PipelineConfig::default()
    }
}

fn build_session(cli: &Cli) -> Result<Box<dyn InferenceSession>, Box<dyn std::error::Error>> {
    let device: ComputeDevice = cli.device.parse()?;
    log::info!("Loading model {} on {device}", cli.model.display());
    let backend = OnnxSsdBackend::new(&cli.model, device)?;
    Ok(Box::new(ThreadedInferenceSession::new(backend)))
}

fn build_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.replay {
        return Ok(Box::new(ImageSequenceSource::new(dir)));
    }
    camera_source(cli.camera)
}

#[cfg(feature = "opencv")]
fn camera_source(index: i32) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    Ok(Box::new(OpenCvCamera::new(index)))
}

#[cfg(not(feature = "opencv"))]
fn camera_source(_index: i32) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    Err("this build has no camera support (rebuild with --features opencv or use --replay)".into())
}

fn build_display(cli: &Cli) -> Box<dyn DisplaySurface> {
    if cli.headless {
        return Box::new(HeadlessDisplay::new());
    }
    window_display(&cli.window)
}

#[cfg(feature = "opencv")]
fn window_display(name: &str) -> Box<dyn DisplaySurface> {
    Box::new(OpenCvWindow::new(name))
}

#[cfg(not(feature = "opencv"))]
fn window_display(name: &str) -> Box<dyn DisplaySurface> {
    log::warn!("No window support in this build, running '{name}' headless");
    Box::new(HeadlessDisplay::new())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.model.exists() {
        return Err(format!("Model file not found: {}", cli.model.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    if cli.key_delay_ms == 0 {
        return Err("Key delay must be at least 1 ms".into());
    }
    if let Some(dir) = &cli.replay {
        if !dir.is_dir() {
            return Err(format!("Replay directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("facecam").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.model, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(cli.device, "CPU");
        assert_eq!(cli.color, "RED");
        assert_eq!(cli.threshold, 0.5);
        assert_eq!(cli.camera, 0);
        assert_eq!(cli.window, "Face-Detection_v1");
        assert_eq!(cli.key_delay_ms, 60);
        assert_eq!(cli.poll_interval_ms, 5);
        assert!(!cli.headless);
        assert!(cli.replay.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-m", "face.onnx", "-d", "GPU", "-c", "green", "-t", "0.7"]);
        assert_eq!(cli.model, PathBuf::from("face.onnx"));
        assert_eq!(cli.device, "GPU");
        let config = build_config(&cli);
        assert_eq!(config.box_color, BoxColor::Green);
        assert_eq!(config.confidence_threshold, 0.7);
    }

    #[test]
    fn test_validate_rejects_missing_model() {
        let cli = parse(&["-m", "/nonexistent/model.onnx"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_validate_threshold_and_key_delay() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("face.onnx");
        std::fs::write(&model, b"").unwrap();
        let model = model.to_string_lossy().to_string();

        assert!(validate(&parse(&["-m", &model])).is_ok());
        assert!(validate(&parse(&["-m", &model, "-t", "1.5"])).is_err());
        assert!(validate(&parse(&["-m", &model, "--key-delay-ms", "0"])).is_err());
        assert!(validate(&parse(&["-m", &model, "--replay", "/nonexistent/frames"])).is_err());
    }

    #[test]
    fn test_unknown_colour_falls_back_to_red() {
        let config = build_config(&parse(&["-c", "purple"]));
        assert_eq!(config.box_color, BoxColor::Red);
    }
}
