/// The single line of text telling the user what the recognizer sees,
/// or why it could not start.
pub trait StatusDisplay: Send {
    fn set_text(&mut self, text: &str);
}
