//! Search session: one query in, two independent branches out.
//!
//! ```text
//! QuerySubmission
//!        │
//!        ▼
//! SearchOrchestrator::submit()      ← sync: both branches → Loading
//!        │
//!        ├─ tokio task: list-search ─▶ categorize ─▶ apply_list
//!        └─ tokio task: synthesis   ─────────────▶ apply_synthesis
//!
//! SharedSession (Arc<Mutex<SessionState>>) ←── read by the renderer
//! SessionEvent (mpsc)                      ──▶ tells the renderer what changed
//! ```

pub mod orchestrator;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{CatalogLoad, SearchOrchestrator, SessionEvent, Submission};
pub use state::{
    lock_session, new_shared_session, BranchStatus, SessionState, SharedSession,
};
