use thiserror::Error;

/// Why a session could not start. The loop never runs after one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    #[error("cannot open video source: {0}")]
    Camera(String),
    #[error("cannot load hand landmark model: {0}")]
    Model(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StartupError {
    /// Text shown on the status display.
    pub fn status_text(&self) -> String {
        format!("Error: {self}")
    }
}
