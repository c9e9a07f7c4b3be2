use crate::detection::domain::landmark_source::LandmarkSource;
use crate::detection::infrastructure::detector_factory::{create_detector, DetectorConfig};
use crate::presentation::domain::render_surface::RenderSurface;
use crate::presentation::domain::speech_output::SpeechOutput;
use crate::presentation::domain::status_display::StatusDisplay;
use crate::shared::model_resolver::ProgressFn;
use crate::shared::stream_metadata::StreamMetadata;
use crate::video::domain::media_source::MediaSource;

use super::frame_loop::{FrameLoop, LoopConfig};
use super::loop_logger::LoopLogger;
use super::startup_error::StartupError;

/// A started session, ready to run.
pub struct Session {
    pub metadata: StreamMetadata,
    pub frame_loop: FrameLoop,
}

/// Brings a session up: open the stream, size the overlay, load the
/// detector, assemble the loop. The first failing step aborts startup.
///
/// Single use: `execute` consumes the collaborators.
pub struct StartSessionUseCase {
    media: Box<dyn MediaSource>,
    surface: Box<dyn RenderSurface>,
    status: Box<dyn StatusDisplay>,
    speech: Box<dyn SpeechOutput>,
    logger: Box<dyn LoopLogger>,
    detector_config: DetectorConfig,
    loop_config: LoopConfig,
    on_download: Option<ProgressFn>,
}

impl StartSessionUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        media: Box<dyn MediaSource>,
        surface: Box<dyn RenderSurface>,
        status: Box<dyn StatusDisplay>,
        speech: Box<dyn SpeechOutput>,
        logger: Box<dyn LoopLogger>,
        detector_config: DetectorConfig,
        loop_config: LoopConfig,
        on_download: Option<ProgressFn>,
    ) -> Self {
        Self {
            media,
            surface,
            status,
            speech,
            logger,
            detector_config,
            loop_config,
            on_download,
        }
    }

    /// On failure the error is logged and shown on the status display as
    /// `Error: <message>` before being returned.
    pub fn execute(self) -> Result<Session, StartupError> {
        let Self {
            mut media,
            mut surface,
            mut status,
            speech,
            logger,
            detector_config,
            loop_config,
            on_download,
        } = self;

        let prepared = prepare(
            media.as_mut(),
            surface.as_mut(),
            &detector_config,
            &loop_config,
            on_download,
        );
        let (metadata, detector) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                log::error!("{e}");
                status.set_text(&e.status_text());
                media.close();
                return Err(e);
            }
        };

        let frame_loop = FrameLoop::new(
            media,
            detector,
            surface,
            status,
            speech,
            logger,
            loop_config,
        );
        Ok(Session {
            metadata,
            frame_loop,
        })
    }
}

fn prepare(
    media: &mut dyn MediaSource,
    surface: &mut dyn RenderSurface,
    detector_config: &DetectorConfig,
    loop_config: &LoopConfig,
    on_download: Option<ProgressFn>,
) -> Result<(StreamMetadata, Box<dyn LandmarkSource>), StartupError> {
    validate(detector_config, loop_config)?;

    let metadata = media
        .acquire_stream()
        .map_err(|e| StartupError::Camera(e.to_string()))?;
    if metadata.width == 0 || metadata.height == 0 {
        return Err(StartupError::Camera(
            "stream reported an empty frame size".to_string(),
        ));
    }
    surface.resize(metadata.width, metadata.height);

    let detector = create_detector(detector_config, on_download)
        .map_err(|e| StartupError::Model(e.to_string()))?;

    log::info!(
        "Session ready: {}x{} @ {:.1} fps",
        metadata.width,
        metadata.height,
        metadata.fps
    );
    Ok((metadata, detector))
}

fn validate(
    detector_config: &DetectorConfig,
    loop_config: &LoopConfig,
) -> Result<(), StartupError> {
    if !(0.0..=1.0).contains(&detector_config.min_confidence) {
        return Err(StartupError::Config(format!(
            "confidence must be between 0 and 1, got {}",
            detector_config.min_confidence
        )));
    }
    if detector_config.max_hands == 0 {
        return Err(StartupError::Config("max_hands must be at least 1".to_string()));
    }
    if detector_config.model_asset_location.trim().is_empty() {
        return Err(StartupError::Config("no model location given".to_string()));
    }
    if loop_config.marker_radius == 0 {
        return Err(StartupError::Config("marker radius must be positive".to_string()));
    }
    Ok(())
}
