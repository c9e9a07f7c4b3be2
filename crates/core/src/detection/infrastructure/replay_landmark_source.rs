use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::hand_landmarks::{HandObservation, Landmark, LandmarkError};
use crate::detection::domain::landmark_source::{EstimateOptions, LandmarkSource};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("cannot read landmark recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: {source}")]
    Landmarks {
        line: usize,
        #[source]
        source: LandmarkError,
    },
}

#[derive(Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    hands: Vec<RecordedHand>,
}

#[derive(Deserialize)]
struct RecordedHand {
    keypoints: Vec<RecordedKeypoint>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Deserialize)]
struct RecordedKeypoint {
    x: f64,
    y: f64,
    #[serde(default)]
    z: Option<f64>,
}

impl RecordedHand {
    fn into_observation(self) -> Result<HandObservation, LandmarkError> {
        let points: Vec<Landmark> = self
            .keypoints
            .into_iter()
            .map(|k| Landmark {
                x: k.x,
                y: k.y,
                z: k.z,
            })
            .collect();
        let hand = HandObservation::from_points(&points)?;
        Ok(match self.score {
            Some(score) => hand.with_score(score),
            None => hand,
        })
    }
}

/// Plays back landmarks recorded as JSON lines, one line per video frame:
///
/// ```text
/// {"hands":[{"keypoints":[{"x":312.0,"y":240.5,"z":-0.01}, ...],"score":0.97}]}
/// ```
///
/// Line N answers for the frame with index N. A blank line is a frame
/// without a hand, as are frames past the end of the recording. Keypoints
/// are in unmirrored frame pixels and are reflected when a mirrored
/// estimate is requested.
pub struct ReplayLandmarkSource {
    frames: Vec<Vec<HandObservation>>,
    max_hands: usize,
}

impl ReplayLandmarkSource {
    pub fn open(path: &Path, max_hands: usize) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Self::parse(&text, max_hands)?;
        log::info!(
            "Loaded {} recorded frame(s) from {}",
            source.len(),
            path.display()
        );
        Ok(source)
    }

    pub fn parse(text: &str, max_hands: usize) -> Result<Self, ReplayError> {
        let mut frames = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() {
                frames.push(Vec::new());
                continue;
            }
            let recorded: RecordedFrame =
                serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                    line: line_no,
                    source,
                })?;
            let hands = recorded
                .hands
                .into_iter()
                .map(|h| h.into_observation())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ReplayError::Landmarks {
                    line: line_no,
                    source,
                })?;
            frames.push(hands);
        }
        Ok(Self { frames, max_hands })
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for ReplayLandmarkSource {
    fn estimate_hands(
        &mut self,
        frame: &Frame,
        options: EstimateOptions,
    ) -> Result<Vec<HandObservation>, Box<dyn std::error::Error>> {
        let Some(hands) = self.frames.get(frame.index()) else {
            return Ok(Vec::new());
        };
        let width = frame.width() as f64;
        Ok(hands
            .iter()
            .take(self.max_hands)
            .map(|h| {
                if options.flip_horizontal {
                    h.mirrored(width)
                } else {
                    h.clone()
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::hand_landmarks::{INDEX_TIP, WRIST};
    use approx::assert_relative_eq;

    fn hand_json(x0: f64, score: Option<f64>) -> String {
        let points: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x":{},"y":{}}}"#, x0 + i as f64, 100.0 + i as f64))
            .collect();
        match score {
            Some(s) => format!(r#"{{"keypoints":[{}],"score":{s}}}"#, points.join(",")),
            None => format!(r#"{{"keypoints":[{}]}}"#, points.join(",")),
        }
    }

    fn line(hands: &[String]) -> String {
        format!(r#"{{"hands":[{}]}}"#, hands.join(","))
    }

    const UNMIRRORED: EstimateOptions = EstimateOptions {
        flip_horizontal: false,
    };

    #[test]
    fn test_lines_map_to_frame_indices() {
        let text = [
            line(&[hand_json(10.0, Some(0.9))]),
            line(&[]),
            line(&[hand_json(50.0, None)]),
        ]
        .join("\n");
        let mut source = ReplayLandmarkSource::parse(&text, 1).unwrap();
        assert_eq!(source.len(), 3);

        let f0 = source
            .estimate_hands(&Frame::filled(640, 480, [0; 3], 0), UNMIRRORED)
            .unwrap();
        assert_eq!(f0.len(), 1);
        assert_eq!(f0[0].score(), Some(0.9));
        assert_relative_eq!(f0[0].get(WRIST).x, 10.0);

        let f1 = source
            .estimate_hands(&Frame::filled(640, 480, [0; 3], 1), UNMIRRORED)
            .unwrap();
        assert!(f1.is_empty());

        let f2 = source
            .estimate_hands(&Frame::filled(640, 480, [0; 3], 2), UNMIRRORED)
            .unwrap();
        assert_relative_eq!(f2[0].get(INDEX_TIP).x, 58.0);
    }

    #[test]
    fn test_past_end_of_recording_is_no_hand() {
        let mut source = ReplayLandmarkSource::parse(&line(&[hand_json(0.0, None)]), 1).unwrap();
        let hands = source
            .estimate_hands(&Frame::filled(8, 8, [0; 3], 5), UNMIRRORED)
            .unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_blank_line_keeps_later_frames_aligned() {
        let text = format!(
            "{}\n\n{}\n",
            line(&[hand_json(10.0, None)]),
            line(&[hand_json(500.0, None)])
        );
        let mut source = ReplayLandmarkSource::parse(&text, 1).unwrap();
        assert_eq!(source.len(), 3);

        let f1 = source
            .estimate_hands(&Frame::filled(640, 480, [0; 3], 1), UNMIRRORED)
            .unwrap();
        assert!(f1.is_empty());

        let f2 = source
            .estimate_hands(&Frame::filled(640, 480, [0; 3], 2), UNMIRRORED)
            .unwrap();
        assert_eq!(f2.len(), 1);
        assert_relative_eq!(f2[0].get(WRIST).x, 500.0);
    }

    #[test]
    fn test_flip_mirrors_against_frame_width() {
        let mut source = ReplayLandmarkSource::parse(&line(&[hand_json(10.0, None)]), 1).unwrap();
        let hands = source
            .estimate_hands(
                &Frame::filled(640, 480, [0; 3], 0),
                EstimateOptions::default(),
            )
            .unwrap();
        assert_relative_eq!(hands[0].get(WRIST).x, 630.0);
        assert_relative_eq!(hands[0].get(WRIST).y, 100.0);
    }

    #[test]
    fn test_max_hands_truncates() {
        let text = line(&[hand_json(0.0, None), hand_json(100.0, None)]);
        let mut source = ReplayLandmarkSource::parse(&text, 1).unwrap();
        let hands = source
            .estimate_hands(&Frame::filled(8, 8, [0; 3], 0), UNMIRRORED)
            .unwrap();
        assert_eq!(hands.len(), 1);
        assert_relative_eq!(hands[0].get(WRIST).x, 0.0);
    }

    #[test]
    fn test_missing_hands_field_means_none() {
        let mut source = ReplayLandmarkSource::parse("{}", 1).unwrap();
        let hands = source
            .estimate_hands(&Frame::filled(8, 8, [0; 3], 0), UNMIRRORED)
            .unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_malformed_json_reports_line() {
        let text = format!("{}\nnot json", line(&[]));
        let err = ReplayLandmarkSource::parse(&text, 1).err().unwrap();
        assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_wrong_keypoint_count_reports_line() {
        let text = r#"{"hands":[{"keypoints":[{"x":1,"y":2}]}]}"#;
        let err = ReplayLandmarkSource::parse(text, 1).err().unwrap();
        match err {
            ReplayError::Landmarks { line, source } => {
                assert_eq!(line, 1);
                assert_eq!(source, LandmarkError::WrongCount(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.jsonl");
        std::fs::write(&path, line(&[hand_json(1.0, Some(0.5))])).unwrap();
        let source = ReplayLandmarkSource::open(&path, 1).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReplayLandmarkSource::open(&dir.path().join("none.jsonl"), 1)
            .err()
            .unwrap();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}
