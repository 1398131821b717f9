//! Search session state and its reducers.
//!
//! [`SessionState`] is the single source of truth for the renderer: the
//! current query, both branch lifecycles, their results and errors.
//!
//! Every mutation goes through a reducer method.  The `apply_*` reducers are
//! guarded by the submission sequence number: a completion tagged with an
//! older sequence is dropped and the method returns `false`.
//!
//! [`SharedSession`] is a type alias for `Arc<Mutex<SessionState>>`, cheap
//! to clone and safe to share across tasks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::ServiceError;
use crate::recipe::{categorize, CategoryBuckets, Recipe, SynthesizedRecipe};

// ---------------------------------------------------------------------------
// BranchStatus
// ---------------------------------------------------------------------------

/// Lifecycle of one branch.
///
/// ```text
/// Idle ──submit──▶ Loading ──ok──▶ Success
///                          ──err─▶ Error
/// Success / Error ──submit──▶ Loading
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Success,
    /// The latest request failed; see the branch's error message.
    Error,
}

impl BranchStatus {
    /// ```
    /// use recipe_finder::search::BranchStatus;
    ///
    /// assert!(BranchStatus::Loading.is_loading());
    /// assert!(!BranchStatus::Success.is_loading());
    /// ```
    pub fn is_loading(&self) -> bool {
        matches!(self, BranchStatus::Loading)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// State of the one active search session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Text of the latest accepted submission.
    pub query: String,

    pub list_status: BranchStatus,
    /// Categorized catalog or search results.  Kept from the previous
    /// submission until the new list lands.
    pub list_result: CategoryBuckets,
    pub list_error: Option<String>,

    pub synthesis_status: BranchStatus,
    /// Generated recipe for `query`.  Cleared on every new submission.
    pub synthesis_result: Option<SynthesizedRecipe>,
    pub synthesis_error: Option<String>,

    /// Startup catalog failure, kept apart from per-query errors.
    pub catalog_error: Option<String>,

    sequence: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number of the latest accepted submission (0 before any).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Accept a new query and put both branches into `Loading`.
    ///
    /// Returns the submission's sequence number, or `None` (leaving the
    /// state untouched) when `query` is blank.
    pub fn begin_submission(&mut self, query: &str) -> Option<u64> {
        if query.trim().is_empty() {
            return None;
        }

        self.sequence += 1;
        self.query = query.to_string();

        self.list_status = BranchStatus::Loading;
        self.list_error = None;
        self.catalog_error = None;

        self.synthesis_status = BranchStatus::Loading;
        self.synthesis_error = None;
        self.synthesis_result = None;

        Some(self.sequence)
    }

    /// Put the list branch into `Loading` for the startup catalog fetch.
    ///
    /// Returns `None` (leaving the state untouched) once any submission has
    /// been accepted: the list branch then belongs to the latest query.
    /// Otherwise the fetch is tagged with the current sequence, so a
    /// submission accepted before it lands makes it stale.
    pub fn begin_catalog_load(&mut self) -> Option<u64> {
        if self.sequence > 0 {
            return None;
        }
        self.list_status = BranchStatus::Loading;
        self.catalog_error = None;
        Some(self.sequence)
    }

    /// Land a list-search outcome.  Returns `false` if it was stale.
    pub fn apply_list(&mut self, sequence: u64, outcome: Result<Vec<Recipe>, ServiceError>) -> bool {
        if sequence != self.sequence {
            return false;
        }

        match outcome {
            Ok(records) => {
                self.list_result = categorize(&records);
                self.list_status = BranchStatus::Success;
                self.list_error = None;
            }
            Err(e) => {
                self.list_status = BranchStatus::Error;
                self.list_error = Some(format!("Recipe search failed: {e}"));
            }
        }
        true
    }

    /// Land a synthesis outcome.  Returns `false` if it was stale.
    pub fn apply_synthesis(
        &mut self,
        sequence: u64,
        outcome: Result<SynthesizedRecipe, ServiceError>,
    ) -> bool {
        if sequence != self.sequence {
            return false;
        }

        match outcome {
            Ok(recipe) => {
                self.synthesis_result = Some(recipe);
                self.synthesis_status = BranchStatus::Success;
                self.synthesis_error = None;
            }
            Err(e) => {
                self.synthesis_status = BranchStatus::Error;
                self.synthesis_error = Some(format!("Recipe generation failed: {e}"));
            }
        }
        true
    }

    /// Land the startup catalog.  Returns `false` if a submission has been
    /// accepted since the load began.
    pub fn apply_catalog(&mut self, sequence: u64, outcome: Result<Vec<Recipe>, ServiceError>) -> bool {
        if sequence != self.sequence {
            return false;
        }

        match outcome {
            Ok(records) => {
                self.list_result = categorize(&records);
                self.list_status = BranchStatus::Success;
                self.catalog_error = None;
            }
            Err(e) => {
                self.list_status = BranchStatus::Error;
                self.catalog_error = Some(format!("Failed to fetch recipes: {e}"));
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock with [`lock_session`] for a short critical section; do **not** hold
/// the guard across `.await` points.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedSession`] wrapping an idle [`SessionState`].
pub fn new_shared_session() -> SharedSession {
    Arc::new(Mutex::new(SessionState::new()))
}

/// Lock the session.  A reducer cannot leave the state half-written, so a
/// poisoned lock is still safe to use.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
