//! Voice input: one submission stream from typing and speaking.
//!
//! * [`VoiceInputBridge`]: {Idle, Listening} state machine plus the query
//!   text field; emits [`QuerySubmission`]s.
//! * [`SpeechRecognizer`]: the host capability the bridge drives.
//! * [`CommandRecognizer`]: capability backed by an external
//!   speech-to-text command.
//!
//! # Wiring
//!
//! ```rust,no_run
//! use tokio::sync::mpsc;
//! use recipe_finder::voice::{CommandRecognizer, SpeechRecognizer, VoiceInputBridge};
//!
//! # async fn example() {
//! let (submit_tx, mut submit_rx) = mpsc::channel(8);
//! let recognizer = CommandRecognizer::new("my-stt --stdout", "en-US")
//!     .map(|r| Box::new(r) as Box<dyn SpeechRecognizer>);
//! let (mut bridge, mut recognition_rx) = VoiceInputBridge::new(recognizer, submit_tx);
//!
//! bridge.start_listening().ok();
//! while let Some(event) = recognition_rx.recv().await {
//!     if bridge.handle_recognition(event) {
//!         let submission = submit_rx.recv().await.unwrap();
//!         println!("searching for {}", submission.query);
//!         break;
//!     }
//! }
//! # }
//! ```

pub mod bridge;
pub mod recognizer;

pub use bridge::{ListeningState, QuerySource, QuerySubmission, VoiceInputBridge};
pub use recognizer::{
    Alternative, CommandRecognizer, RecognitionEvent, RecognitionKind, SpeechRecognizer,
    VoiceError,
};
