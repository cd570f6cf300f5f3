use std::process::{Child, Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech command is empty")]
    EmptyCommand,

    #[error("failed to start speech command {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads text aloud. Injected so the app runs without an audio device.
pub trait Speaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Speaks nothing. Used when no speech command is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        log::debug!("speech disabled, not reading {text:?}");
        Ok(())
    }
}

/// Runs an external text-to-speech program (e.g. `espeak -s 120`) with the
/// text as its last argument. A new utterance cuts off the previous one.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeaker {
    pub fn new(command: &str) -> Result<Self, SpeechError> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next().ok_or(SpeechError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            current: None,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.stop();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        self.current = Some(child);
        Ok(())
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Speaker for the configured command, or silence when there is none.
pub fn speaker_for(command: Option<&str>) -> Result<Box<dyn Speaker>, SpeechError> {
    match command {
        Some(cmd) => Ok(Box::new(CommandSpeaker::new(cmd)?)),
        None => Ok(Box::new(SilentSpeaker)),
    }
}
