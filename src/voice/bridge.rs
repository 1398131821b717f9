//! Merges typed text and spoken utterances into one submission stream.
//!
//! # State machine
//!
//! ```text
//! Idle ──start_listening()──▶ Listening      (only with a capability)
//! Listening ──stop_listening()───▶ Idle
//!           ──final result───────▶ Idle  + emit Spoken submission
//!           ──end of capture─────▶ Idle
//! ```
//!
//! Whichever of stop / final result / end arrives first closes the session;
//! everything after it for that session is ignored, so one utterance yields
//! at most one submission.  Starting while already listening does nothing.

use tokio::sync::mpsc;

use super::recognizer::{RecognitionEvent, RecognitionKind, SpeechRecognizer, VoiceError};

/// Capacity of the recognizer → bridge channel.
const RECOGNITION_CHANNEL_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

/// Where a submitted query came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Typed,
    Spoken,
}

/// A query handed on to the search orchestrator.  Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySubmission {
    pub query: String,
    pub source: QuerySource,
}

// ---------------------------------------------------------------------------
// VoiceInputBridge
// ---------------------------------------------------------------------------

/// Owns the query text field and the listening state machine.
///
/// Submissions are pushed into the `submissions` channel given at
/// construction.  Recognition events come back through the receiver
/// returned by [`VoiceInputBridge::new`]; the caller forwards them to
/// [`handle_recognition`](Self::handle_recognition).
pub struct VoiceInputBridge {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    state: ListeningState,
    session: u64,
    text: String,
    recognition_tx: mpsc::Sender<RecognitionEvent>,
    submissions: mpsc::Sender<QuerySubmission>,
}

impl VoiceInputBridge {
    /// Create a bridge.  Pass `None` for `recognizer` when the host has no
    /// speech capability; typed search still works.
    pub fn new(
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        submissions: mpsc::Sender<QuerySubmission>,
    ) -> (Self, mpsc::Receiver<RecognitionEvent>) {
        let (recognition_tx, recognition_rx) = mpsc::channel(RECOGNITION_CHANNEL_CAPACITY);
        let bridge = Self {
            recognizer,
            state: ListeningState::Idle,
            session: 0,
            text: String::new(),
            recognition_tx,
            submissions,
        };
        (bridge, recognition_rx)
    }

    /// `false` means voice affordances should be hidden or disabled.
    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    /// Current contents of the query field.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the query field (manual editing).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    // -----------------------------------------------------------------------
    // Listening
    // -----------------------------------------------------------------------

    /// Start a listening session.  No-op when already listening.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        if self.is_listening() {
            log::debug!("voice: already listening (session {})", self.session);
            return Ok(());
        }

        let recognizer = self.recognizer.as_mut().ok_or(VoiceError::Unsupported)?;

        let session = self.session + 1;
        recognizer.start(session, self.recognition_tx.clone())?;

        self.session = session;
        self.state = ListeningState::Listening;
        log::debug!("voice: Idle → Listening (session {session})");
        Ok(())
    }

    /// Stop the current session, if any.
    pub fn stop_listening(&mut self) {
        if !self.is_listening() {
            return;
        }
        self.close_session("stopped");
    }

    /// Feed one event from the recognizer.
    ///
    /// Returns `true` when a submission was emitted.
    pub fn handle_recognition(&mut self, event: RecognitionEvent) -> bool {
        if !self.is_listening() || event.session != self.session {
            log::debug!(
                "voice: ignoring event for session {} (current {}, {:?})",
                event.session,
                self.session,
                self.state
            );
            return false;
        }

        match event.kind {
            RecognitionKind::Result { is_final: false, .. } => false,
            RecognitionKind::Result {
                alternatives,
                is_final: true,
            } => {
                let transcript = alternatives
                    .into_iter()
                    .next()
                    .map(|a| a.transcript.trim().to_string())
                    .unwrap_or_default();

                self.close_session("final result");

                if transcript.is_empty() {
                    log::debug!("voice: final result was empty, nothing submitted");
                    return false;
                }

                self.text = transcript.clone();
                self.emit(QuerySubmission {
                    query: transcript,
                    source: QuerySource::Spoken,
                })
            }
            RecognitionKind::End => {
                self.state = ListeningState::Idle;
                log::debug!("voice: Listening → Idle (capture ended)");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Manual submission
    // -----------------------------------------------------------------------

    /// Submit the current text as typed.  Blank text is ignored.
    ///
    /// Returns `true` when a submission was emitted.
    pub fn submit_text(&mut self) -> bool {
        if self.text.trim().is_empty() {
            return false;
        }
        let query = self.text.clone();
        self.emit(QuerySubmission {
            query,
            source: QuerySource::Typed,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn close_session(&mut self, reason: &str) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.state = ListeningState::Idle;
        log::debug!("voice: Listening → Idle ({reason}, session {})", self.session);
    }

    fn emit(&self, submission: QuerySubmission) -> bool {
        match self.submissions.try_send(submission) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("voice: submission dropped: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
