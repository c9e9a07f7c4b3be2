use crate::shared::constants::NO_HAND_TEXT;

/// Everything the classifier can conclude about one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    ThumbsUp,
    ThumbsDown,
    Victory,
    OpenPalm,
    Fist,
    Unknown,
    NoHandDetected,
}

impl GestureLabel {
    pub const ALL: &[GestureLabel] = &[
        GestureLabel::ThumbsUp,
        GestureLabel::ThumbsDown,
        GestureLabel::Victory,
        GestureLabel::OpenPalm,
        GestureLabel::Fist,
        GestureLabel::Unknown,
        GestureLabel::NoHandDetected,
    ];

    /// Stable identifier for logs and recorded sessions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "thumbs-up",
            Self::ThumbsDown => "thumbs-down",
            Self::Victory => "victory",
            Self::OpenPalm => "open-palm",
            Self::Fist => "fist",
            Self::Unknown => "unknown",
            Self::NoHandDetected => "no-hand",
        }
    }

    /// Text for the status display.
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍 Thumbs Up",
            Self::ThumbsDown => "👎 Thumbs Down",
            Self::Victory => "✌️ Victory",
            Self::OpenPalm => "🖐️ Open Palm",
            Self::Fist => "✊ Fist",
            Self::Unknown => "…",
            Self::NoHandDetected => NO_HAND_TEXT,
        }
    }

    /// Phrase handed to the speech output.
    pub fn spoken_text(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "Thumbs up",
            Self::ThumbsDown => "Thumbs down",
            Self::Victory => "Victory",
            Self::OpenPalm => "Open palm",
            Self::Fist => "Fist",
            Self::Unknown => "Unknown gesture",
            Self::NoHandDetected => NO_HAND_TEXT,
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_text())
    }
}
