//! Speech capability boundary.
//!
//! [`SpeechRecognizer`] is what the bridge drives: start a listening session,
//! stop it, and receive [`RecognitionEvent`]s on a channel in between.
//! Every event carries the session number it was started with so the bridge
//! can ignore stragglers from an earlier session.
//!
//! [`CommandRecognizer`] is the production implementation.  It runs an
//! external speech-to-text program and treats each line it prints as one
//! finished utterance.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

// ---------------------------------------------------------------------------
// VoiceError
// ---------------------------------------------------------------------------

/// Errors raised when starting voice capture.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The host has no speech-recognition capability.
    #[error("speech recognition is not supported here")]
    Unsupported,

    /// The capability exists but could not be started.
    #[error("speech recognition failed to start: {0}")]
    Capability(String),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One candidate transcript for an utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    /// 0.0 – 1.0.  Alternatives are ordered best first.
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionKind {
    /// A recognition result.  Interim results have `is_final == false`.
    Result {
        alternatives: Vec<Alternative>,
        is_final: bool,
    },
    /// Capture ended on the capability's side.
    End,
}

/// An event from the capability, tagged with its listening session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub session: u64,
    pub kind: RecognitionKind,
}

impl RecognitionEvent {
    /// A final result with a single, fully confident alternative.
    pub fn final_transcript(session: u64, transcript: impl Into<String>) -> Self {
        Self {
            session,
            kind: RecognitionKind::Result {
                alternatives: vec![Alternative {
                    transcript: transcript.into(),
                    confidence: 1.0,
                }],
                is_final: true,
            },
        }
    }

    pub fn end(session: u64) -> Self {
        Self {
            session,
            kind: RecognitionKind::End,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// A continuous speech-recognition capability.
///
/// `Send` so the bridge can live inside a tokio task.
pub trait SpeechRecognizer: Send {
    /// Begin capturing.  Events for this session go to `sink`, tagged with
    /// `session`, and the last one should be [`RecognitionKind::End`].
    fn start(
        &mut self,
        session: u64,
        sink: mpsc::Sender<RecognitionEvent>,
    ) -> Result<(), VoiceError>;

    /// Stop capturing.  Must be harmless when nothing is running.
    fn stop(&mut self);
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// CommandRecognizer
// ---------------------------------------------------------------------------

/// Runs an external speech-to-text command for each listening session.
///
/// The command line is split on whitespace (no shell quoting).  The
/// configured language is exported as `SPEECH_LANG`.  Blank output lines are
/// skipped; end of output or process exit ends the session.
#[derive(Debug)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    language: String,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl CommandRecognizer {
    /// Returns `None` when `command_line` is blank.
    pub fn new(command_line: &str, language: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            language: language.to_string(),
            stop_tx: None,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(
        &mut self,
        session: u64,
        sink: mpsc::Sender<RecognitionEvent>,
    ) -> Result<(), VoiceError> {
        self.stop();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("SPEECH_LANG", &self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Capability(format!("{}: {e}", self.program)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Capability("no stdout from speech command".into()))?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line {
                        Ok(Some(text)) => {
                            let text = text.trim();
                            if text.is_empty() {
                                continue;
                            }
                            let event = RecognitionEvent::final_transcript(session, text);
                            if sink.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            log::warn!("voice: reading speech command output failed: {e}");
                            break;
                        }
                    },
                    _ = &mut stop_rx => break,
                }
            }

            if let Err(e) = child.kill().await {
                log::debug!("voice: speech command already gone: {e}");
            }
            let _ = sink.send(RecognitionEvent::end(session)).await;
        });

        log::debug!("voice: session {session} started `{}`", self.program);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
