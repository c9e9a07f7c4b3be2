mod settings;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use signspeak_core::detection::infrastructure::detector_factory::{DetectorConfig, Runtime};
use signspeak_core::pipeline::frame_loop::LoopConfig;
use signspeak_core::pipeline::frame_scheduler::FixedRateScheduler;
use signspeak_core::pipeline::loop_logger::StdoutLoopLogger;
use signspeak_core::pipeline::start_session_use_case::StartSessionUseCase;
use signspeak_core::presentation::domain::render_surface::RenderSurface;
use signspeak_core::presentation::domain::speech_output::SpeechOutput;
use signspeak_core::presentation::infrastructure::command_speech_output::{
    CommandSpeechOutput, SpeechCommand,
};
use signspeak_core::presentation::infrastructure::frame_overlay_surface::FrameOverlaySurface;
use signspeak_core::presentation::infrastructure::log_speech_output::LogSpeechOutput;
use signspeak_core::presentation::infrastructure::log_status_display::LogStatusDisplay;
use signspeak_core::shared::constants::{DEFAULT_MARKER_COLOR, MAX_HANDS};
use signspeak_core::video::domain::media_source::MediaSource;
use signspeak_core::video::infrastructure::ffmpeg_media_source::{CaptureTarget, FfmpegMediaSource};
use signspeak_core::video::infrastructure::image_file_writer::ImageFileWriter;
use signspeak_core::video::infrastructure::image_sequence_source::{is_image, ImageSequenceSource};

use settings::Settings;

/// Recognizes hand gestures in live or recorded video and speaks them.
#[derive(Parser, Debug)]
#[command(name = "signspeak")]
struct Cli {
    /// Video file, image, or directory of images.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Capture device, e.g. /dev/video0 (Linux), 0 (macOS), "video=Camera" (Windows).
    #[arg(long)]
    camera: Option<String>,

    /// Hand landmark ONNX model: local path or http(s) URL.
    #[arg(long)]
    model: Option<String>,

    /// Replay recorded landmarks from a JSON-lines file instead of running a model.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Minimum hand presence score (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Loop rate in frames per second (default: the stream's own rate).
    #[arg(long)]
    fps: Option<f64>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Do not mirror the view horizontally.
    #[arg(long)]
    no_mirror: bool,

    /// Log utterances instead of speaking them.
    #[arg(long)]
    mute: bool,

    /// Do not speak "Unknown gesture".
    #[arg(long)]
    quiet_unknown: bool,

    /// Write every frame with its landmark overlay to this directory as PNG.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Landmark marker radius in pixels.
    #[arg(long)]
    marker_radius: Option<u32>,

    /// Text-to-speech command; `{text}` is replaced by the phrase, otherwise
    /// the phrase is appended.
    #[arg(long)]
    speech_command: Option<String>,

    /// Settings file (default: the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restart image input from the first image when it runs out.
    #[arg(long)]
    loop_input: bool,
}

/// Settings after applying command-line overrides.
#[derive(Debug, Clone, PartialEq)]
struct Options {
    fps: Option<f64>,
    fallback_fps: f64,
    confidence: f64,
    mirror: bool,
    announce_unknown: bool,
    marker_radius: u32,
    speech_command: Option<String>,
}

impl Options {
    fn merge(cli: &Cli, settings: Settings) -> Self {
        Self {
            fps: cli.fps,
            fallback_fps: settings.fps,
            confidence: cli.confidence.unwrap_or(settings.confidence),
            mirror: settings.mirror && !cli.no_mirror,
            announce_unknown: settings.announce_unknown && !cli.quiet_unknown,
            marker_radius: cli.marker_radius.unwrap_or(settings.marker_radius),
            speech_command: cli.speech_command.clone().or(settings.speech_command),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let options = Options::merge(&cli, settings);
    validate(&cli, &options)?;

    let media = build_media_source(&cli)?;
    let surface = build_surface(cli.overlay_dir.as_deref())?;
    let speech = build_speech(cli.mute, options.speech_command.as_deref())?;

    let mut detector_config = match (&cli.model, &cli.landmarks) {
        (Some(model), None) => DetectorConfig::new(Runtime::Onnx, model.clone()),
        (None, Some(path)) => DetectorConfig::new(Runtime::Replay, path.to_string_lossy()),
        _ => return Err("Exactly one of --model or --landmarks is required".into()),
    };
    detector_config.min_confidence = options.confidence;
    detector_config.max_hands = MAX_HANDS;

    let loop_config = build_loop_config(&cli, &options);
    ctrlc::set_handler(interrupt_handler(loop_config.cancelled.clone()))?;

    let session = StartSessionUseCase::new(
        media,
        surface,
        Box::new(LogStatusDisplay::new()),
        speech,
        Box::new(StdoutLoopLogger::default()),
        detector_config,
        loop_config,
        Some(Box::new(download_progress)),
    )
    .execute()?;

    let fps = options
        .fps
        .unwrap_or_else(|| session.metadata.effective_fps(options.fallback_fps));
    log::info!("Running at {fps:.1} fps");

    let mut frame_loop = session.frame_loop;
    let mut scheduler = FixedRateScheduler::new(fps);
    let report = frame_loop.run(&mut scheduler);
    log::info!(
        "Processed {} frames ({} skipped, {} without a hand), spoke {} time(s)",
        report.ticks,
        report.skipped,
        report.no_hand,
        report.utterances
    );
    Ok(())
}

fn build_loop_config(cli: &Cli, options: &Options) -> LoopConfig {
    LoopConfig {
        flip_horizontal: options.mirror,
        marker_radius: options.marker_radius,
        marker_color: DEFAULT_MARKER_COLOR,
        announce_unknown: options.announce_unknown,
        max_frames: cli.max_frames,
        ..LoopConfig::default()
    }
}

/// Ctrl-C asks the frame loop to stop after the current tick.
fn interrupt_handler(cancelled: Arc<AtomicBool>) -> impl Fn() + Send + 'static {
    move || {
        log::info!("Interrupted, stopping after the current frame");
        cancelled.store(true, Ordering::Relaxed);
    }
}

fn build_media_source(cli: &Cli) -> Result<Box<dyn MediaSource>, Box<dyn std::error::Error>> {
    match (&cli.input, &cli.camera) {
        (Some(input), None) if input.is_dir() || is_image(input) => Ok(Box::new(
            ImageSequenceSource::new(input).looping(cli.loop_input),
        )),
        (Some(input), None) => {
            if cli.loop_input {
                log::warn!("--loop-input only applies to image input; ignoring");
            }
            Ok(Box::new(FfmpegMediaSource::new(CaptureTarget::File(
                input.clone(),
            ))))
        }
        (None, Some(device)) => Ok(Box::new(FfmpegMediaSource::new(CaptureTarget::Device(
            device.clone(),
        )))),
        _ => Err("Exactly one of --input or --camera is required".into()),
    }
}

fn build_surface(
    overlay_dir: Option<&Path>,
) -> Result<Box<dyn RenderSurface>, Box<dyn std::error::Error>> {
    let surface = FrameOverlaySurface::new();
    match overlay_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            log::info!("Writing overlay frames to {}", dir.display());
            Ok(Box::new(
                surface.with_output(Box::new(ImageFileWriter::new()), dir.to_path_buf()),
            ))
        }
        None => Ok(Box::new(surface)),
    }
}

fn build_speech(
    mute: bool,
    command: Option<&str>,
) -> Result<Box<dyn SpeechOutput>, Box<dyn std::error::Error>> {
    if mute {
        return Ok(Box::new(LogSpeechOutput::new()));
    }
    let command = match command {
        Some(line) => SpeechCommand::parse(line).ok_or("Speech command is empty")?,
        None => SpeechCommand::platform_default(),
    };
    log::info!("Speaking with {}", command.program);
    Ok(Box::new(CommandSpeechOutput::new(command)))
}

fn validate(cli: &Cli, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    if cli.input.is_some() == cli.camera.is_some() {
        return Err("Exactly one of --input or --camera is required".into());
    }
    if let Some(input) = &cli.input {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if cli.model.is_some() == cli.landmarks.is_some() {
        return Err("Exactly one of --model or --landmarks is required".into());
    }
    if !(0.0..=1.0).contains(&options.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            options.confidence
        )
        .into());
    }
    if let Some(fps) = options.fps {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(format!("FPS must be positive, got {fps}").into());
        }
    }
    if !(options.fallback_fps.is_finite() && options.fallback_fps > 0.0) {
        return Err(format!(
            "Settings fps must be positive, got {}",
            options.fallback_fps
        )
        .into());
    }
    if options.marker_radius == 0 {
        return Err("Marker radius must be positive".into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading hand landmark model... {pct}%");
    } else {
        eprint!("\rDownloading hand landmark model... {downloaded} bytes");
    }
}
