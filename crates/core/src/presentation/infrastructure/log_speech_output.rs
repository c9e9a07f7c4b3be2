use crate::presentation::domain::speech_output::SpeechOutput;

/// Silent stand-in for a speech synthesizer: each utterance becomes a log line.
#[derive(Debug, Default)]
pub struct LogSpeechOutput {
    utterances: usize,
}

impl LogSpeechOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> usize {
        self.utterances
    }
}

impl SpeechOutput for LogSpeechOutput {
    fn speak(&mut self, text: &str) {
        self.utterances += 1;
        log::info!("Speak: {text}");
    }
}
