use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::detection::domain::landmark_source::{EstimateOptions, LandmarkSource};
use crate::gesture::domain::gesture_classifier::classify_pose;
use crate::gesture::domain::gesture_label::GestureLabel;
use crate::gesture::domain::hand_pose::HandPose;
use crate::gesture::domain::spoken_state::SpokenState;
use crate::presentation::domain::render_surface::RenderSurface;
use crate::presentation::domain::speech_output::SpeechOutput;
use crate::presentation::domain::status_display::StatusDisplay;
use crate::shared::constants::{DEFAULT_MARKER_COLOR, DEFAULT_MARKER_RADIUS};
use crate::video::domain::media_source::MediaSource;

use super::frame_scheduler::FrameScheduler;
use super::loop_logger::LoopLogger;

#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Treat the input as a selfie view: landmarks and the presented frame
    /// are mirrored horizontally.
    pub flip_horizontal: bool,
    pub marker_radius: u32,
    pub marker_color: [u8; 3],
    /// Speak "Unknown gesture" when the label changes to Unknown.
    pub announce_unknown: bool,
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            flip_horizontal: true,
            marker_radius: DEFAULT_MARKER_RADIUS,
            marker_color: DEFAULT_MARKER_COLOR,
            announce_unknown: true,
            max_frames: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Classified(GestureLabel),
    NoHand,
    /// The frame could not be read or analysed; nothing was updated.
    Skipped,
    EndOfStream,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopReport {
    /// Frames pulled from the source, including skipped ones.
    pub ticks: usize,
    pub skipped: usize,
    pub no_hand: usize,
    pub utterances: usize,
}

/// Per-frame detect, classify, render and speak cycle.
///
/// Owns every collaborator for the lifetime of the session. Each tick runs to
/// completion before the next is scheduled.
pub struct FrameLoop {
    media: Box<dyn MediaSource>,
    detector: Box<dyn LandmarkSource>,
    surface: Box<dyn RenderSurface>,
    status: Box<dyn StatusDisplay>,
    speech: Box<dyn SpeechOutput>,
    logger: Box<dyn LoopLogger>,
    config: LoopConfig,
    spoken: SpokenState,
    report: LoopReport,
}

impl FrameLoop {
    pub fn new(
        media: Box<dyn MediaSource>,
        detector: Box<dyn LandmarkSource>,
        surface: Box<dyn RenderSurface>,
        status: Box<dyn StatusDisplay>,
        speech: Box<dyn SpeechOutput>,
        logger: Box<dyn LoopLogger>,
        config: LoopConfig,
    ) -> Self {
        Self {
            media,
            detector,
            surface,
            status,
            speech,
            logger,
            config,
            spoken: SpokenState::new(),
            report: LoopReport::default(),
        }
    }

    pub fn spoken_state(&self) -> &SpokenState {
        &self.spoken
    }

    pub fn report(&self) -> LoopReport {
        self.report
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Processes one frame.
    pub fn tick(&mut self) -> TickOutcome {
        let frame = match self.media.next_frame() {
            None => return TickOutcome::EndOfStream,
            Some(Err(e)) => {
                self.report.ticks += 1;
                return self.skip(&format!("Cannot read frame: {e}"));
            }
            Some(Ok(frame)) => frame,
        };
        self.report.ticks += 1;

        let options = EstimateOptions {
            flip_horizontal: self.config.flip_horizontal,
        };
        let detect_start = Instant::now();
        let hands = match self.detector.estimate_hands(&frame, options) {
            Ok(hands) => hands,
            Err(e) => {
                let message = format!("Hand detection failed on frame {}: {e}", frame.index());
                return self.skip(&message);
            }
        };
        self.logger.timing("detect", elapsed_ms(detect_start));
        self.logger.metric("hands", hands.len() as f64);
        if hands.len() > 1 {
            log::debug!("Ignoring {} extra hand(s) on frame {}", hands.len() - 1, frame.index());
        }

        self.surface.clear();
        let outcome = match hands.first() {
            Some(hand) => {
                for p in hand.points() {
                    self.surface.fill_circle(
                        p.x,
                        p.y,
                        self.config.marker_radius,
                        self.config.marker_color,
                    );
                }

                let classify_start = Instant::now();
                let pose = HandPose::from_observation(hand);
                let label = classify_pose(&pose);
                self.logger.timing("classify", elapsed_ms(classify_start));
                log::debug!("Frame {}: {} {pose:?}", frame.index(), label.as_str());

                self.status.set_text(label.display_text());
                if self.spoken.observe(label)
                    && (label != GestureLabel::Unknown || self.config.announce_unknown)
                {
                    self.speech.speak(label.spoken_text());
                    self.report.utterances += 1;
                }
                TickOutcome::Classified(label)
            }
            None => {
                self.status.set_text(GestureLabel::NoHandDetected.display_text());
                self.spoken.reset();
                self.report.no_hand += 1;
                TickOutcome::NoHand
            }
        };

        let render_start = Instant::now();
        let presented = if self.config.flip_horizontal {
            self.surface.present(&frame.flipped_horizontal())
        } else {
            self.surface.present(&frame)
        };
        if let Err(e) = presented {
            log::warn!("Cannot present frame {}: {e}", frame.index());
        }
        self.logger.timing("render", elapsed_ms(render_start));
        self.logger.progress(self.report.ticks);

        outcome
    }

    /// Ticks until end of stream, cancellation, or the frame limit.
    pub fn run(&mut self, scheduler: &mut dyn FrameScheduler) -> LoopReport {
        let cancelled = self.config.cancelled.clone();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                self.logger.info("Cancelled");
                break;
            }
            if self
                .config
                .max_frames
                .is_some_and(|max| self.report.ticks >= max)
            {
                self.logger.info("Frame limit reached");
                break;
            }
            if !scheduler.wait_next(&cancelled) {
                self.logger.info("Cancelled");
                break;
            }
            if self.tick() == TickOutcome::EndOfStream {
                self.logger.info("End of stream");
                break;
            }
        }

        self.media.close();
        self.logger.summary();
        self.report
    }

    fn skip(&mut self, message: &str) -> TickOutcome {
        log::warn!("{message}");
        self.report.skipped += 1;
        TickOutcome::Skipped
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
