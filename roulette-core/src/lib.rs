//! roulette-core: selection and reconciliation engine for roulette
//!
//! This crate picks one participant at random from a pool, keeps the local
//! view in step with a remote system of record, and aggregates past picks:
//!
//! - **Filtering** - [`filter::eligible`] derives the draw candidates for a [`FilterKey`]
//! - **Drawing** - [`draw::draw`] with an injected [`RandomSource`]
//! - **Provisional skips** - [`ExclusionLedger`] for rejected outcomes
//! - **Remote collaborator** - [`ReconciliationClient`] and [`MockReconciliationClient`]
//! - **History** - [`history::aggregate`] into a [`DateIndex`]
//! - **Orchestration** - [`SelectionSession`] state machine
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use roulette_core::{MockReconciliationClient, Participant, SelectionSession, StdRandom};
//!
//! async fn example() -> Result<(), roulette_core::SelectionError> {
//!     let client = Arc::new(MockReconciliationClient::new(vec![
//!         Participant::new("1", "Ana").with_tag("web"),
//!         Participant::new("2", "Leo").with_tag("web"),
//!     ]));
//!     let mut session = SelectionSession::new(client).with_rng(StdRandom::seeded(7));
//!     session.start().await?;
//!
//!     let draw = session.request_draw()?;
//!     println!("Today: {}", draw.participant.name());
//!     session.confirm().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod draw;
pub mod error;
pub mod filter;
pub mod history;
pub mod ledger;
pub mod preferences;
pub mod session;
pub mod types;

// Re-export key types for convenience
pub use client::{MockReconciliationClient, ReconciliationClient};
pub use draw::{DrawResult, EmptyPoolError, RandomSource, StdRandom};
pub use error::{ClientError, ClientOperation, PreferenceError, SelectionError};
pub use filter::{Eligibility, Excludes};
pub use history::DateIndex;
pub use ledger::{ExclusionLedger, ExclusionReason};
pub use preferences::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, Preferences};
pub use session::{RefreshOutcome, SelectionSession, SessionState};
pub use types::{ALL_FILTER, FilterCatalog, FilterKey, HistoricalOutcome, Participant, ParticipantId};
