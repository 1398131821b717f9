//! Terminal front end: one-shot commands and the interactive loop.
//!
//! The interactive loop is the only place where the components meet:
//!
//! ```text
//! stdin line ──▶ VoiceInputBridge::submit_text ─┐
//! speech     ──▶ VoiceInputBridge::handle_recognition ─┤
//!                                               ▼
//!                                   QuerySubmission (mpsc)
//!                                               │
//!                                               ▼
//!                             SearchOrchestrator::submit
//!                                               │
//!                              SessionEvent (mpsc) ──▶ render
//! ```

pub mod render;

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::api::{RecipeService, ServiceError};
use crate::config::{AppConfig, DisplayConfig};
use crate::detail::RecipeDetailLoader;
use crate::search::{SearchOrchestrator, SessionEvent};
use crate::voice::{CommandRecognizer, SpeechRecognizer, VoiceError, VoiceInputBridge};

/// Build the speech capability described by `config`, if any.
pub fn recognizer_from_config(config: &AppConfig) -> Option<Box<dyn SpeechRecognizer>> {
    let command = config.voice.active_command()?;
    let recognizer = CommandRecognizer::new(command, &config.voice.language)?;
    log::info!("voice: using `{}` for speech input", recognizer.program());
    Some(Box::new(recognizer))
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

/// Load the catalog and print the browse rows.
pub async fn browse(service: Arc<dyn RecipeService>, display: &DisplayConfig) -> Result<()> {
    let orchestrator = SearchOrchestrator::new(service);
    if let Some(catalog) = orchestrator.load_catalog() {
        catalog.settled().await;
    }

    let state = orchestrator.snapshot();
    print!("{}", render::render_list_section(&state, display));
    if let Some(e) = state.catalog_error {
        bail!(e);
    }
    Ok(())
}

/// Run one query and print each section as soon as its branch lands.
pub async fn search(
    service: Arc<dyn RecipeService>,
    query: &str,
    display: &DisplayConfig,
) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::channel(8);
    let orchestrator = SearchOrchestrator::new(service).with_events(events_tx);

    let Some(submission) = orchestrator.submit(query) else {
        bail!("nothing to search for");
    };
    let sequence = submission.sequence;

    let mut pending = 2;
    while pending > 0 {
        let Some(event) = events_rx.recv().await else { break };
        let state = orchestrator.snapshot();
        match event {
            SessionEvent::SynthesisUpdated { sequence: s } if s == sequence => {
                println!("{}", render::render_synthesis_section(&state));
                pending -= 1;
            }
            SessionEvent::ListUpdated { sequence: s } if s == sequence => {
                print!("{}", render::render_list_section(&state, display));
                pending -= 1;
            }
            _ => {}
        }
    }

    submission.settled().await;
    Ok(())
}

/// Detail view text for `:show`, with failures as one-line messages.
async fn detail_text(loader: &RecipeDetailLoader, id: u64) -> String {
    match loader.load_by_id(id).await {
        Ok(detail) => render::render_detail(&detail),
        Err(ServiceError::NotFound) => format!("Recipe {id} not found\n"),
        Err(e) => format!("Error: {e}\n"),
    }
}

/// Print one recipe.  `NotFound` is reported, not retried.
pub async fn show(service: Arc<dyn RecipeService>, id: u64) -> Result<()> {
    let loader = RecipeDetailLoader::new(service);
    match loader.load_by_id(id).await {
        Ok(detail) => {
            print!("{}", render::render_detail(&detail));
            Ok(())
        }
        Err(ServiceError::NotFound) => bail!("Recipe {id} not found"),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

const HELP: &str = "\
Type a query and press Enter to search.
  :listen      start voice capture (one utterance)
  :stop        stop voice capture
  :show <id>   show a recipe
  :session     reprint the current results
  :help        this text
  :quit        exit";

/// REPL over stdin.  Returns when stdin closes or on `:quit`.
pub async fn interactive(
    service: Arc<dyn RecipeService>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    display: &DisplayConfig,
) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::channel(32);
    let (submit_tx, mut submit_rx) = mpsc::channel(8);

    let orchestrator = SearchOrchestrator::new(Arc::clone(&service)).with_events(events_tx);
    let loader = RecipeDetailLoader::new(service);
    let (mut bridge, mut recognition_rx) = VoiceInputBridge::new(recognizer, submit_tx);

    println!("{HELP}");
    if !bridge.is_supported() {
        println!("(voice input unavailable: set [voice] command in settings.toml)");
    }

    // Dropped rather than awaited: the loop keeps accepting input while the
    // catalog loads.
    let _catalog = orchestrator.load_catalog();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim_end();
                match line.split_once(' ').unwrap_or((line, "")) {
                    (":quit", _) | (":q", _) => break,
                    (":help", _) => println!("{HELP}"),
                    (":listen", _) => match bridge.start_listening() {
                        Ok(()) => println!("Listening…"),
                        Err(VoiceError::Unsupported) => println!("Voice input is not available."),
                        Err(e) => println!("{e}"),
                    },
                    (":stop", _) => {
                        bridge.stop_listening();
                        println!("Stopped listening.");
                    }
                    (":show", arg) => match arg.trim().parse::<u64>() {
                        Ok(id) => {
                            // Prints whenever it lands; the loop does not wait.
                            let loader = loader.clone();
                            tokio::spawn(async move {
                                print!("{}", detail_text(&loader, id).await);
                            });
                        }
                        Err(_) => println!("usage: :show <id>"),
                    },
                    (":session", _) => {
                        print!("{}", render::render_session(&orchestrator.snapshot(), display));
                    }
                    (cmd, _) if cmd.starts_with(':') => println!("unknown command {cmd}, try :help"),
                    _ => {
                        bridge.set_text(line);
                        bridge.submit_text();
                    }
                }
            }
            Some(event) = recognition_rx.recv() => {
                bridge.handle_recognition(event);
                if !bridge.is_listening() {
                    log::debug!("voice: session closed");
                }
            }
            Some(submission) = submit_rx.recv() => {
                log::info!("query {:?} ({:?})", submission.query, submission.source);
                if orchestrator.submit(&submission.query).is_some() {
                    println!("Searching for \"{}\"…", submission.query);
                }
            }
            Some(event) = events_rx.recv() => {
                let state = orchestrator.snapshot();
                match event {
                    SessionEvent::Submitted { .. } => {}
                    SessionEvent::SynthesisUpdated { .. } => {
                        println!("{}", render::render_synthesis_section(&state));
                    }
                    SessionEvent::ListUpdated { .. } | SessionEvent::CatalogUpdated => {
                        print!("{}", render::render_list_section(&state, display));
                    }
                }
            }
        }
    }

    bridge.stop_listening();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::recipe::{Recipe, RecipeDetail, SynthesizedRecipe};

    /// Serves recipe 42 once its gate opens; everything else is unknown.
    struct SlowDetail {
        gate: Semaphore,
    }

    #[async_trait]
    impl RecipeService for SlowDetail {
        async fn list_catalog(&self) -> Result<Vec<Recipe>, ServiceError> {
            Ok(Vec::new())
        }

        async fn search_from_text(&self, _prompt: &str) -> Result<Vec<Recipe>, ServiceError> {
            Ok(Vec::new())
        }

        async fn generate(&self, prompt: &str) -> Result<SynthesizedRecipe, ServiceError> {
            Ok(SynthesizedRecipe {
                title: prompt.to_string(),
                meal_time: "Lunch".into(),
                ingredients: vec![],
                instructions: vec![],
            })
        }

        async fn fetch_by_id(&self, id: u64) -> Result<RecipeDetail, ServiceError> {
            if id != 42 {
                return Err(ServiceError::NotFound);
            }
            self.gate.acquire().await.unwrap().forget();
            Ok(serde_json::from_value(serde_json::json!({ "id": 42, "title": "Shakshuka" })).unwrap())
        }
    }

    #[tokio::test]
    async fn detail_text_reports_missing_recipe() {
        let service = Arc::new(SlowDetail { gate: Semaphore::new(0) });
        let loader = RecipeDetailLoader::new(service);
        assert_eq!(detail_text(&loader, 7).await, "Recipe 7 not found\n");
    }

    #[tokio::test]
    async fn pending_detail_does_not_hold_up_searches() {
        let service = Arc::new(SlowDetail { gate: Semaphore::new(0) });
        let loader = RecipeDetailLoader::new(Arc::clone(&service) as Arc<dyn RecipeService>);
        let orchestrator = SearchOrchestrator::new(Arc::clone(&service) as Arc<dyn RecipeService>);

        let detail = tokio::spawn(async move { detail_text(&loader, 42).await });

        orchestrator.submit("soup").unwrap().settled().await;
        assert_eq!(
            orchestrator.snapshot().synthesis_result.map(|r| r.title).as_deref(),
            Some("soup")
        );
        assert!(!detail.is_finished());

        service.gate.add_permits(1);
        assert!(detail.await.unwrap().contains("Shakshuka"));
    }
}
