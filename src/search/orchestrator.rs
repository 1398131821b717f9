//! Search orchestrator: fans one query out into list-search and synthesis.
//!
//! # Flow
//!
//! ```text
//! submit("tacos")
//!   └─▶ begin_submission            [both branches Loading, seq = n]
//!         ├─ spawn: service.search_from_text ─▶ apply_list(n, …)
//!         └─ spawn: service.generate         ─▶ apply_synthesis(n, …)
//! ```
//!
//! The two tasks never wait on each other.  Each completion is handed to a
//! [`SessionState`] reducer that drops it if a newer submission has been
//! accepted in the meantime.  Nothing is cancelled: superseded requests run
//! to completion and their results are simply discarded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::RecipeService;

use super::state::{lock_session, new_shared_session, SessionState, SharedSession};

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Change notifications for the renderer.
///
/// Only applied changes are announced; stale completions are silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A query was accepted and both branches are loading.
    Submitted { sequence: u64, query: String },
    /// The list branch of `sequence` settled.
    ListUpdated { sequence: u64 },
    /// The synthesis branch of `sequence` settled.
    SynthesisUpdated { sequence: u64 },
    /// The startup catalog load settled.
    CatalogUpdated,
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// In-flight branches of one accepted submission.
///
/// Dropping the handle does not stop the branches.
#[derive(Debug)]
pub struct Submission {
    pub sequence: u64,
    list: JoinHandle<()>,
    synthesis: JoinHandle<()>,
}

impl Submission {
    /// Wait until both branches have landed (or been discarded).
    pub async fn settled(self) {
        let (list, synthesis) = tokio::join!(self.list, self.synthesis);
        for (branch, joined) in [("list", list), ("synthesis", synthesis)] {
            if let Err(e) = joined {
                log::warn!("search: {branch} task for #{} failed: {e}", self.sequence);
            }
        }
    }
}

/// In-flight startup catalog fetch.
#[derive(Debug)]
pub struct CatalogLoad {
    task: JoinHandle<()>,
}

impl CatalogLoad {
    pub async fn settled(self) {
        if let Err(e) = self.task.await {
            log::warn!("search: catalog task failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOrchestrator
// ---------------------------------------------------------------------------

/// Owns the search session and drives both branches of every query.
///
/// Cheap to clone; clones share the same session.  Must be used from inside
/// a tokio runtime.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use recipe_finder::api::HttpRecipeService;
/// use recipe_finder::config::AppConfig;
/// use recipe_finder::search::SearchOrchestrator;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let service = Arc::new(HttpRecipeService::from_config(&config.service));
/// let orchestrator = SearchOrchestrator::new(service);
///
/// if let Some(catalog) = orchestrator.load_catalog() {
///     catalog.settled().await;
/// }
/// if let Some(submission) = orchestrator.submit("weeknight curry") {
///     submission.settled().await;
/// }
/// let session = orchestrator.snapshot();
/// println!("{} recipes", session.list_result.recommended.len());
/// # }
/// ```
#[derive(Clone)]
pub struct SearchOrchestrator {
    session: SharedSession,
    service: Arc<dyn RecipeService>,
    events: Option<mpsc::Sender<SessionEvent>>,
}

impl SearchOrchestrator {
    /// Create an orchestrator with a fresh idle session.
    pub fn new(service: Arc<dyn RecipeService>) -> Self {
        Self {
            session: new_shared_session(),
            service,
            events: None,
        }
    }

    /// Announce every applied change on `events`.
    pub fn with_events(mut self, events: mpsc::Sender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        lock_session(&self.session).clone()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Submit `query`.
    ///
    /// Both branches are `Loading` by the time this returns.  Blank queries
    /// are ignored and return `None`.
    pub fn submit(&self, query: &str) -> Option<Submission> {
        let sequence = lock_session(&self.session).begin_submission(query)?;
        log::debug!("search: #{sequence} submitted {query:?}");

        self.notify_now(SessionEvent::Submitted {
            sequence,
            query: query.to_string(),
        });

        let list = {
            let session = Arc::clone(&self.session);
            let service = Arc::clone(&self.service);
            let events = self.events.clone();
            let prompt = query.to_string();
            tokio::spawn(async move {
                let outcome = service.search_from_text(&prompt).await;
                if let Err(e) = &outcome {
                    log::warn!("search: #{sequence} list-search failed: {e}");
                }
                let applied = lock_session(&session).apply_list(sequence, outcome);
                if applied {
                    notify(&events, SessionEvent::ListUpdated { sequence }).await;
                } else {
                    log::debug!("search: #{sequence} list result superseded, discarded");
                }
            })
        };

        let synthesis = {
            let session = Arc::clone(&self.session);
            let service = Arc::clone(&self.service);
            let events = self.events.clone();
            let prompt = query.to_string();
            tokio::spawn(async move {
                let outcome = service.generate(&prompt).await;
                if let Err(e) = &outcome {
                    log::warn!("search: #{sequence} synthesis failed: {e}");
                }
                let applied = lock_session(&session).apply_synthesis(sequence, outcome);
                if applied {
                    notify(&events, SessionEvent::SynthesisUpdated { sequence }).await;
                } else {
                    log::debug!("search: #{sequence} synthesis superseded, discarded");
                }
            })
        };

        Some(Submission {
            sequence,
            list,
            synthesis,
        })
    }

    /// Fetch the full catalog into the list branch.
    ///
    /// Meant to run once at startup.  Returns `None` without fetching once a
    /// query has been submitted.  If a query is submitted before the catalog
    /// arrives, the catalog is discarded.
    pub fn load_catalog(&self) -> Option<CatalogLoad> {
        let Some(sequence) = lock_session(&self.session).begin_catalog_load() else {
            log::debug!("search: catalog load skipped, a query owns the list");
            return None;
        };
        log::debug!("search: catalog load started");

        let session = Arc::clone(&self.session);
        let service = Arc::clone(&self.service);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let outcome = service.list_catalog().await;
            match &outcome {
                Ok(records) => log::info!("search: catalog returned {} recipes", records.len()),
                Err(e) => log::error!("search: catalog load failed: {e}"),
            }
            let applied = lock_session(&session).apply_catalog(sequence, outcome);
            if applied {
                notify(&events, SessionEvent::CatalogUpdated).await;
            } else {
                log::debug!("search: catalog superseded by a query, discarded");
            }
        });

        Some(CatalogLoad { task })
    }

    fn notify_now(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            if let Err(e) = tx.try_send(event) {
                log::warn!("search: dropped session event: {e}");
            }
        }
    }
}

async fn notify(events: &Option<mpsc::Sender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = events {
        // A closed receiver just means nobody is rendering any more.
        let _ = tx.send(event).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::api::ServiceError;
    use crate::recipe::{Recipe, RecipeDetail, SynthesizedRecipe};
    use crate::search::BranchStatus;

    // -----------------------------------------------------------------------
    // Test double
    // -----------------------------------------------------------------------

    /// Recipe service whose answers are derived from the prompt.
    ///
    /// * list-search returns one recipe titled after the prompt;
    /// * synthesis returns a recipe titled after the prompt;
    /// * gated prompts block until [`ScriptedService::release`] is called
    ///   (one permit per branch call).
    #[derive(Default)]
    struct ScriptedService {
        gates: Mutex<HashMap<String, Arc<Semaphore>>>,
        failing_list: HashSet<String>,
        failing_synthesis: HashSet<String>,
        catalog_gate: Option<Arc<Semaphore>>,
        catalog: Option<Vec<Recipe>>,
    }

    impl ScriptedService {
        fn new() -> Self {
            Self::default()
        }

        fn gated(self, prompt: &str) -> Self {
            self.gates
                .lock()
                .unwrap()
                .insert(prompt.to_string(), Arc::new(Semaphore::new(0)));
            self
        }

        fn failing_list(mut self, prompt: &str) -> Self {
            self.failing_list.insert(prompt.to_string());
            self
        }

        fn failing_synthesis(mut self, prompt: &str) -> Self {
            self.failing_synthesis.insert(prompt.to_string());
            self
        }

        fn with_catalog(mut self, catalog: Vec<Recipe>) -> Self {
            self.catalog = Some(catalog);
            self
        }

        fn gated_catalog(mut self) -> Self {
            self.catalog_gate = Some(Arc::new(Semaphore::new(0)));
            self
        }

        /// Let both branches of `prompt` through.
        fn release(&self, prompt: &str) {
            let gate = self.gates.lock().unwrap().get(prompt).cloned();
            gate.expect("prompt was not gated").add_permits(2);
        }

        fn release_catalog(&self) {
            self.catalog_gate.as_ref().expect("catalog not gated").add_permits(1);
        }

        async fn wait(&self, prompt: &str) {
            let gate = self.gates.lock().unwrap().get(prompt).cloned();
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
        }
    }

    fn recipe(id: u64, title: &str) -> Recipe {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    #[async_trait]
    impl RecipeService for ScriptedService {
        async fn list_catalog(&self) -> Result<Vec<Recipe>, ServiceError> {
            if let Some(gate) = &self.catalog_gate {
                gate.acquire().await.unwrap().forget();
            }
            self.catalog
                .clone()
                .ok_or_else(|| ServiceError::BadResponse("503 Service Unavailable".into()))
        }

        async fn search_from_text(&self, prompt: &str) -> Result<Vec<Recipe>, ServiceError> {
            self.wait(prompt).await;
            if self.failing_list.contains(prompt) {
                return Err(ServiceError::Network("connection reset".into()));
            }
            Ok(vec![recipe(1, prompt)])
        }

        async fn generate(&self, prompt: &str) -> Result<SynthesizedRecipe, ServiceError> {
            self.wait(prompt).await;
            if self.failing_synthesis.contains(prompt) {
                return Err(ServiceError::BadResponse("500 Internal Server Error".into()));
            }
            Ok(SynthesizedRecipe {
                title: prompt.to_string(),
                meal_time: "Dinner".into(),
                ingredients: vec!["salt".into()],
                instructions: vec!["cook".into()],
            })
        }

        async fn fetch_by_id(&self, _id: u64) -> Result<RecipeDetail, ServiceError> {
            Err(ServiceError::NotFound)
        }
    }

    fn orchestrator(service: Arc<ScriptedService>) -> SearchOrchestrator {
        SearchOrchestrator::new(service)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn submit_resolves_both_branches() {
        let orc = orchestrator(Arc::new(ScriptedService::new()));

        orc.submit("pasta").unwrap().settled().await;

        let st = orc.snapshot();
        assert_eq!(st.query, "pasta");
        assert_eq!(st.list_status, BranchStatus::Success);
        assert_eq!(st.synthesis_status, BranchStatus::Success);
        assert_eq!(st.list_result.recommended[0].title, "pasta");
        assert_eq!(st.synthesis_result.unwrap().title, "pasta");
    }

    #[tokio::test]
    async fn loading_is_visible_before_any_branch_resolves() {
        let service = Arc::new(ScriptedService::new().gated("soup"));
        let orc = orchestrator(Arc::clone(&service));

        let submission = orc.submit("soup").unwrap();
        let st = orc.snapshot();
        assert!(st.list_status.is_loading());
        assert!(st.synthesis_status.is_loading());

        service.release("soup");
        submission.settled().await;
        assert_eq!(orc.snapshot().list_status, BranchStatus::Success);
    }

    #[tokio::test]
    async fn blank_queries_do_nothing() {
        let (tx, mut rx) = mpsc::channel(8);
        let orc = orchestrator(Arc::new(ScriptedService::new())).with_events(tx);

        assert!(orc.submit("").is_none());
        assert!(orc.submit("   ").is_none());

        let st = orc.snapshot();
        assert_eq!(st.sequence(), 0);
        assert_eq!(st.list_status, BranchStatus::Idle);
        assert_eq!(st.synthesis_status, BranchStatus::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn later_query_wins_when_earlier_resolves_last() {
        let service = Arc::new(ScriptedService::new().gated("pasta").gated("tacos"));
        let orc = orchestrator(Arc::clone(&service));

        let pasta = orc.submit("pasta").unwrap();
        let tacos = orc.submit("tacos").unwrap();

        service.release("tacos");
        tacos.settled().await;
        service.release("pasta");
        pasta.settled().await;

        let st = orc.snapshot();
        assert_eq!(st.query, "tacos");
        assert_eq!(st.list_result.recommended.len(), 1);
        assert_eq!(st.list_result.recommended[0].title, "tacos");
        assert_eq!(st.synthesis_result.unwrap().title, "tacos");
    }

    #[tokio::test]
    async fn stale_response_cannot_overwrite_pending_newer_query() {
        let service = Arc::new(ScriptedService::new().gated("pasta").gated("tacos"));
        let orc = orchestrator(Arc::clone(&service));

        let pasta = orc.submit("pasta").unwrap();
        let tacos = orc.submit("tacos").unwrap();

        service.release("pasta");
        pasta.settled().await;

        let st = orc.snapshot();
        assert!(st.list_status.is_loading());
        assert!(st.synthesis_status.is_loading());
        assert!(st.synthesis_result.is_none());

        service.release("tacos");
        tacos.settled().await;
        assert_eq!(orc.snapshot().list_result.recommended[0].title, "tacos");
    }

    #[tokio::test]
    async fn synthesis_failure_does_not_touch_list() {
        let service = Arc::new(ScriptedService::new().failing_synthesis("curry"));
        let orc = orchestrator(service);

        orc.submit("curry").unwrap().settled().await;

        let st = orc.snapshot();
        assert_eq!(st.synthesis_status, BranchStatus::Error);
        assert!(st.synthesis_error.is_some());
        assert!(st.synthesis_result.is_none());
        assert_eq!(st.list_status, BranchStatus::Success);
        assert!(st.list_error.is_none());
        assert_eq!(st.list_result.recommended[0].title, "curry");
    }

    #[tokio::test]
    async fn list_failure_does_not_touch_synthesis() {
        let service = Arc::new(ScriptedService::new().failing_list("curry"));
        let orc = orchestrator(service);

        orc.submit("curry").unwrap().settled().await;

        let st = orc.snapshot();
        assert_eq!(st.list_status, BranchStatus::Error);
        assert!(st.list_error.as_deref().unwrap().contains("connection reset"));
        assert_eq!(st.synthesis_status, BranchStatus::Success);
        assert!(st.synthesis_error.is_none());
    }

    #[tokio::test]
    async fn new_query_clears_previous_errors() {
        let service = Arc::new(ScriptedService::new().failing_synthesis("bad"));
        let orc = orchestrator(service);

        orc.submit("bad").unwrap().settled().await;
        assert!(orc.snapshot().synthesis_error.is_some());

        orc.submit("good").unwrap().settled().await;
        let st = orc.snapshot();
        assert!(st.synthesis_error.is_none());
        assert_eq!(st.synthesis_status, BranchStatus::Success);
    }

    #[tokio::test]
    async fn catalog_populates_list() {
        let service = ScriptedService::new().with_catalog(vec![recipe(1, "a"), recipe(2, "b")]);
        let orc = orchestrator(Arc::new(service));

        orc.load_catalog().unwrap().settled().await;

        let st = orc.snapshot();
        assert_eq!(st.list_status, BranchStatus::Success);
        assert_eq!(st.list_result.recommended.len(), 2);
        assert_eq!(st.synthesis_status, BranchStatus::Idle);
        assert!(st.catalog_error.is_none());
    }

    #[tokio::test]
    async fn catalog_failure_sets_catalog_error() {
        let orc = orchestrator(Arc::new(ScriptedService::new()));

        orc.load_catalog().unwrap().settled().await;

        let st = orc.snapshot();
        assert_eq!(st.list_status, BranchStatus::Error);
        assert!(st.catalog_error.as_deref().unwrap().contains("503"));
        assert!(st.list_error.is_none());
    }

    #[tokio::test]
    async fn late_catalog_does_not_replace_search_results() {
        let service = Arc::new(
            ScriptedService::new()
                .with_catalog(vec![recipe(1, "a"), recipe(2, "b"), recipe(3, "c")])
                .gated_catalog(),
        );
        let orc = orchestrator(Arc::clone(&service));

        let catalog = orc.load_catalog().unwrap();
        orc.submit("risotto").unwrap().settled().await;

        service.release_catalog();
        catalog.settled().await;

        let st = orc.snapshot();
        assert_eq!(st.list_result.recommended.len(), 1);
        assert_eq!(st.list_result.recommended[0].title, "risotto");
    }

    #[tokio::test]
    async fn catalog_requested_after_submit_keeps_search_results() {
        let service = Arc::new(
            ScriptedService::new()
                .with_catalog(vec![recipe(7, "a"), recipe(8, "b"), recipe(9, "c")])
                .gated("tacos"),
        );
        let orc = orchestrator(Arc::clone(&service));

        let tacos = orc.submit("tacos").unwrap();
        assert!(orc.load_catalog().is_none());
        assert!(orc.snapshot().list_status.is_loading());

        service.release("tacos");
        tacos.settled().await;

        let st = orc.snapshot();
        assert_eq!(st.list_status, BranchStatus::Success);
        assert_eq!(st.list_result.recommended.len(), 1);
        assert_eq!(st.list_result.recommended[0].title, "tacos");
    }

    #[tokio::test]
    async fn events_announce_only_applied_changes() {
        let service = Arc::new(ScriptedService::new().gated("pasta"));
        let (tx, mut rx) = mpsc::channel(16);
        let orc = orchestrator(Arc::clone(&service)).with_events(tx);

        let pasta = orc.submit("pasta").unwrap();
        orc.submit("tacos").unwrap().settled().await;
        service.release("pasta");
        pasta.settled().await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events[..2],
            [
                SessionEvent::Submitted { sequence: 1, query: "pasta".into() },
                SessionEvent::Submitted { sequence: 2, query: "tacos".into() },
            ]
        );
        assert_eq!(events.len(), 4);
        assert!(events.contains(&SessionEvent::ListUpdated { sequence: 2 }));
        assert!(events.contains(&SessionEvent::SynthesisUpdated { sequence: 2 }));
    }
}
