//! Collaborator interface to the remote system of record
//!
//! The engine never talks to storage directly. It fetches the pool and the
//! history, commits selections and requests resets through
//! [`ReconciliationClient`]. Implementations attach credentials and pick the
//! transport; `roulette-remote` provides the HTTP one.

mod mock;
pub mod wire;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::{FilterKey, HistoricalOutcome, Participant, ParticipantId};

pub use mock::MockReconciliationClient;
pub use wire::{CommitRequest, HistoryEntry, PoolEntry, ResetRequest};

/// Remote system of record for the pool and its history
///
/// Calls may fail independently and carry no ordering guarantee between
/// each other. The engine does not retry any of them.
#[async_trait]
pub trait ReconciliationClient: Send + Sync {
    /// Current pool. The remote side may auto-reset an exhausted pool before
    /// answering; the returned snapshot is authoritative either way.
    async fn fetch_pool(&self, filter: &FilterKey) -> Result<Vec<Participant>, ClientError>;

    /// Every recorded outcome, oldest first
    async fn fetch_history(&self) -> Result<Vec<HistoricalOutcome>, ClientError>;

    /// Mark `id` selected under `filter`
    async fn commit_selection(
        &self,
        id: &ParticipantId,
        filter: &FilterKey,
    ) -> Result<(), ClientError>;

    /// Clear every selected flag for `filter`. Resetting a fresh pool succeeds.
    async fn request_reset(&self, filter: &FilterKey) -> Result<(), ClientError>;
}
