/// Speaks a phrase. Fire-and-forget: implementations must return without
/// waiting for the utterance to finish.
pub trait SpeechOutput: Send {
    fn speak(&mut self, text: &str);
}
