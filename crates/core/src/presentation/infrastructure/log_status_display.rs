use crate::presentation::domain::status_display::StatusDisplay;

/// Status line rendered to the log. Repeated text is logged once.
#[derive(Debug, Default)]
pub struct LogStatusDisplay {
    text: String,
    updates: usize,
}

impl LogStatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of times the visible text actually changed.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl StatusDisplay for LogStatusDisplay {
    fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_string();
        self.updates += 1;
        log::info!("Status: {text}");
    }
}
