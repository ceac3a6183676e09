//! Optional speech-to-text capability.
//!
//! The core never assumes voice input exists: front-ends hold an
//! `Option<Arc<dyn VoiceCapture>>` and fall back to text-only input.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::TriageCfg;

/// Notice shown when no capture backend is configured.
pub const UNSUPPORTED_NOTICE: &str = "Voice input not supported in this terminal.";
/// Notice shown when a capture attempt fails.
pub const CAPTURE_FAILED_NOTICE: &str = "Microphone error. Please allow access.";

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("voice input unsupported")]
    Unsupported,
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no speech detected")]
    NoSpeech,
    #[error("capture failed: {0}")]
    Capture(String),
}

impl VoiceError {
    /// User-facing notice for this error.
    pub fn notice(&self) -> &'static str {
        match self {
            VoiceError::Unsupported => UNSUPPORTED_NOTICE,
            _ => CAPTURE_FAILED_NOTICE,
        }
    }
}

/// One-shot speech capture returning the final transcript.
pub trait VoiceCapture: Send + Sync {
    fn name(&self) -> &str;

    fn capture(&self) -> Pin<Box<dyn Future<Output = Result<String, VoiceError>> + Send + '_>>;
}

/// Microphone trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicState {
    #[default]
    Ready,
    Listening,
}

impl MicState {
    pub fn label(self) -> &'static str {
        match self {
            MicState::Ready => "🎤",
            MicState::Listening => "🎙️",
        }
    }
}

/// Runs an external speech-to-text command; its trimmed stdout is the transcript.
#[derive(Debug, Clone)]
pub struct CommandVoice {
    command: String,
    lang: String,
}

impl CommandVoice {
    pub fn new(command: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            lang: lang.into(),
        }
    }

    async fn run(&self) -> Result<String, VoiceError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("TRIAGE_VOICE_LANG", &self.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => VoiceError::Unsupported,
                std::io::ErrorKind::PermissionDenied => VoiceError::PermissionDenied,
                _ => VoiceError::Capture(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Capture(format!(
                "{} ({})",
                output.status,
                stderr.trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(VoiceError::NoSpeech);
        }
        Ok(transcript)
    }
}

/// Build the configured capture backend, if any.
pub fn from_cfg(cfg: &TriageCfg) -> Option<CommandVoice> {
    cfg.voice_command
        .as_deref()
        .map(|cmd| CommandVoice::new(cmd, cfg.voice_lang.clone()))
}

impl VoiceCapture for CommandVoice {
    fn name(&self) -> &str {
        &self.command
    }

    fn capture(&self) -> Pin<Box<dyn Future<Output = Result<String, VoiceError>> + Send + '_>> {
        Box::pin(self.run())
    }
}

/// Mock capture for tests. Returns a fixed transcript or error.
#[derive(Debug, Clone)]
pub struct MockVoice {
    result: Result<String, String>,
}

impl MockVoice {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            result: Ok(transcript.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            result: Err(reason.into()),
        }
    }
}

impl VoiceCapture for MockVoice {
    fn name(&self) -> &str {
        "mock"
    }

    fn capture(&self) -> Pin<Box<dyn Future<Output = Result<String, VoiceError>> + Send + '_>> {
        let result = self.result.clone().map_err(VoiceError::Capture);
        Box::pin(async move { result })
    }
}
