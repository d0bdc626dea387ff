//! Selection session orchestration

mod selection;
pub mod state;

pub use selection::SelectionSession;
pub use state::{RefreshOutcome, SessionState};
