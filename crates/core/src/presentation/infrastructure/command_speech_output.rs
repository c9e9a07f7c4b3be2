use std::process::{Command, Stdio};
use std::thread::JoinHandle;

use crate::presentation::domain::speech_output::SpeechOutput;

/// Placeholder replaced by the utterance inside command arguments.
const TEXT_PLACEHOLDER: &str = "{text}";

/// External text-to-speech program and its arguments.
///
/// Arguments containing `{text}` receive the utterance in place; when none
/// does, the utterance is appended as the last argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SpeechCommand {
    /// Parses a whitespace-separated command line such as `espeak -s 150`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The platform's stock speech synthesizer.
    pub fn platform_default() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self {
                program: "say".to_string(),
                args: Vec::new(),
            }
        }
        #[cfg(target_os = "windows")]
        {
            Self {
                program: "powershell".to_string(),
                args: vec![
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    "Add-Type -AssemblyName System.Speech; \
                     (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{text}')"
                        .to_string(),
                ],
            }
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Self {
                program: "espeak".to_string(),
                args: Vec::new(),
            }
        }
    }

    /// Final argument list for one utterance.
    pub fn args_for(&self, text: &str) -> Vec<String> {
        let text = sanitize(text);
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(TEXT_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(TEXT_PLACEHOLDER, &text)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(text);
        }
        args
    }
}

/// Speaks through an external TTS program on a background thread.
///
/// `speak` only queues the phrase. While one utterance plays, newer phrases
/// replace each other, so the next one played is always the latest gesture.
/// Dropping the output waits for pending speech to end.
pub struct CommandSpeechOutput {
    tx: Option<crossbeam_channel::Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl CommandSpeechOutput {
    pub fn new(command: SpeechCommand) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        let worker = std::thread::spawn(move || run_worker(command, rx));
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }
}

impl Default for CommandSpeechOutput {
    fn default() -> Self {
        Self::new(SpeechCommand::platform_default())
    }
}

impl SpeechOutput for CommandSpeechOutput {
    fn speak(&mut self, text: &str) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(text.to_string()).is_err() {
            log::warn!("Speech worker has stopped; dropping \"{text}\"");
        }
    }
}

impl Drop for CommandSpeechOutput {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Speech worker panicked");
            }
        }
    }
}

fn run_worker(command: SpeechCommand, rx: crossbeam_channel::Receiver<String>) {
    let mut reported_failure = false;
    while let Ok(mut text) = rx.recv() {
        let mut stale = 0;
        while let Ok(newer) = rx.try_recv() {
            text = newer;
            stale += 1;
        }
        if stale > 0 {
            log::debug!("Skipped {stale} stale utterance(s)");
        }
        let status = Command::new(&command.program)
            .args(command.args_for(&text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => log::debug!("Spoke \"{text}\""),
            Ok(status) => log::warn!("{} exited with {status}", command.program),
            Err(e) if !reported_failure => {
                reported_failure = true;
                log::warn!("Cannot run speech program {}: {e}", command.program);
            }
            Err(_) => {}
        }
    }
}

/// Keeps the utterance safe to embed inside a quoted shell or PowerShell string.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '.' | '!' | '?' | '-'))
        .collect()
}
