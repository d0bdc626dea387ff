//! SelectionSession: owns the pool snapshot, ledger and date index for one
//! filter and drives the draw → commit → refresh cycle.
//!
//! Mutating operations take `&mut self`, so one session never runs two of
//! them at once. The remote snapshot is only replaced by a refresh, and a
//! refresh requested while a decision is pending is deferred rather than
//! applied under a drawn index.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::state::{RefreshOutcome, SessionState};
use crate::client::ReconciliationClient;
use crate::draw::{self, DrawResult, EmptyPoolError, RandomSource, StdRandom};
use crate::error::{ClientOperation, SelectionError};
use crate::filter::{self, Eligibility};
use crate::history::{self, DateIndex};
use crate::ledger::ExclusionLedger;
use crate::preferences::{MemoryPreferenceStore, PreferenceStore, Preferences};
use crate::types::{FilterCatalog, FilterKey, HistoricalOutcome, Participant, ParticipantId};

pub struct SelectionSession {
    client: Arc<dyn ReconciliationClient>,
    rng: Box<dyn RandomSource>,
    preferences: Box<dyn PreferenceStore>,
    catalog: FilterCatalog,
    filter: FilterKey,
    pool: Vec<Participant>,
    eligible: Vec<Participant>,
    ledger: ExclusionLedger,
    history: Vec<HistoricalOutcome>,
    date_index: DateIndex,
    state: SessionState,
    /// Last confirmed outcome
    outcome: Option<DrawResult>,
    refresh_deferred: bool,
}

impl SelectionSession {
    /// Create a session under the `all` filter with an entropy-seeded source
    /// and in-memory preferences. Call [`start`](Self::start) before drawing.
    pub fn new(client: Arc<dyn ReconciliationClient>) -> Self {
        Self {
            client,
            rng: Box::new(StdRandom::from_entropy()),
            preferences: Box::new(MemoryPreferenceStore::new()),
            catalog: FilterCatalog::new(),
            filter: FilterKey::All,
            pool: Vec::new(),
            eligible: Vec::new(),
            ledger: ExclusionLedger::new(),
            history: Vec::new(),
            date_index: DateIndex::new(),
            state: SessionState::Idle,
            outcome: None,
            refresh_deferred: false,
        }
    }

    #[must_use]
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.preferences = Box::new(store);
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: FilterCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn filter(&self) -> &FilterKey {
        &self.filter
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    /// Full pool snapshot from the last successful refresh
    pub fn pool(&self) -> &[Participant] {
        &self.pool
    }

    /// Current draw candidates, in pool order
    pub fn eligible(&self) -> &[Participant] {
        &self.eligible
    }

    pub fn ledger(&self) -> &ExclusionLedger {
        &self.ledger
    }

    /// Provisionally skipped participants still present in the snapshot
    pub fn excluded_participants(&self) -> Vec<&Participant> {
        self.pool
            .iter()
            .filter(|p| self.ledger.is_excluded(p.id()))
            .collect()
    }

    pub fn history(&self) -> &[HistoricalOutcome] {
        &self.history
    }

    pub fn date_index(&self) -> &DateIndex {
        &self.date_index
    }

    /// Pending outcome while a decision is open, otherwise the last confirmed one
    pub fn outcome(&self) -> Option<&DrawResult> {
        self.state.pending_draw().or(self.outcome.as_ref())
    }

    pub fn pending_draw(&self) -> Option<&DrawResult> {
        self.state.pending_draw()
    }

    pub fn is_exhausted(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn has_deferred_refresh(&self) -> bool {
        self.refresh_deferred
    }

    pub fn classify(&self, participant: &Participant) -> Eligibility {
        filter::classify(participant, &self.filter, &self.ledger)
    }

    // ==================== Lifecycle ====================

    /// Initial refresh, then restore the stored filter preference if the
    /// refreshed catalog still knows it.
    ///
    /// Selection flags and remote auto-reset are per filter, so a restored
    /// filter is fetched again under its own key.
    pub async fn start(&mut self) -> Result<(), SelectionError> {
        self.request_refresh().await?;
        if self.restore_preferred_filter() {
            self.refresh_now().await?;
        }
        Ok(())
    }

    /// Returns whether the active filter changed.
    fn restore_preferred_filter(&mut self) -> bool {
        let stored = match self.preferences.load() {
            Ok(preferences) => preferences.filter,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable preferences");
                return false;
            }
        };
        let Some(raw) = stored else {
            return false;
        };

        match self.catalog.parse(&raw) {
            Ok(key) if key != self.filter => {
                info!(filter = %key, "Restoring preferred filter");
                self.apply_filter(key);
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!(filter = %raw, "Stored filter preference is no longer valid");
                false
            }
        }
    }

    // ==================== Draw protocol ====================

    /// Draw one participant from the current eligible subset.
    ///
    /// Fails with [`SelectionError::ConcurrentDraw`] while another outcome is
    /// pending, with [`SelectionError::RefreshPending`] until a deferred
    /// refresh has been flushed, and with [`SelectionError::EmptyPool`] when
    /// nobody is left.
    pub fn request_draw(&mut self) -> Result<DrawResult, SelectionError> {
        if self.state.pending_draw().is_some() {
            return Err(SelectionError::ConcurrentDraw);
        }
        self.require_idle()?;
        if self.refresh_deferred {
            return Err(SelectionError::RefreshPending);
        }

        self.outcome = None;
        self.transition(SessionState::Drawing);

        match draw::draw(&self.eligible, self.rng.as_mut()) {
            Ok(result) => {
                info!(
                    participant = %result.participant.name(),
                    index = result.index,
                    candidates = self.eligible.len(),
                    filter = %self.filter,
                    "Participant drawn"
                );
                self.transition(SessionState::AwaitingConfirmation {
                    draw: result.clone(),
                });
                Ok(result)
            }
            Err(EmptyPoolError) => {
                info!(filter = %self.filter, "Pool exhausted");
                self.transition(SessionState::Idle);
                Err(SelectionError::EmptyPool {
                    filter: self.filter.clone(),
                })
            }
        }
    }

    /// Commit the pending outcome remotely, then refresh.
    ///
    /// A failed commit leaves the session awaiting confirmation with nothing
    /// changed locally, so the caller may retry. If the commit succeeds but
    /// the refresh fails, the returned error names the fetch operation and
    /// the refresh is recorded as deferred.
    pub async fn confirm(&mut self) -> Result<Participant, SelectionError> {
        let draw = self.take_awaiting()?;
        let id = draw.participant.id().clone();
        self.transition(SessionState::Committing { draw: draw.clone() });

        if let Err(source) = self.client.commit_selection(&id, &self.filter).await {
            warn!(participant = %id, filter = %self.filter, error = %source, "Commit failed");
            self.transition(SessionState::AwaitingConfirmation { draw });
            return Err(SelectionError::collaborator(
                ClientOperation::CommitSelection,
                source,
            ));
        }

        info!(
            participant = %draw.participant.name(),
            filter = %self.filter,
            "Selection committed"
        );
        let participant = draw.participant.clone();
        self.outcome = Some(draw);
        self.transition(SessionState::Idle);

        if let Err(e) = self.refresh_now().await {
            self.refresh_deferred = true;
            return Err(e);
        }
        Ok(participant)
    }

    /// Provisionally exclude the pending outcome and return to `Idle`.
    ///
    /// The participant stays in the snapshot and can be reinstated.
    pub fn reject(&mut self) -> Result<Participant, SelectionError> {
        let draw = self.take_awaiting()?;
        self.transition(SessionState::Excluding { draw: draw.clone() });

        self.ledger.exclude(draw.participant.id().clone());
        self.outcome = None;
        self.recompute_eligible();
        info!(
            participant = %draw.participant.name(),
            remaining = self.eligible.len(),
            "Outcome rejected"
        );

        self.transition(SessionState::Idle);
        Ok(draw.participant)
    }

    /// Drop a pending decision without committing or excluding.
    ///
    /// Pool and ledger are left untouched. Returns the discarded outcome.
    pub fn abandon(&mut self) -> Option<DrawResult> {
        let draw = self.state.pending_draw().cloned()?;
        debug!(participant = %draw.participant.name(), "Pending outcome abandoned");
        self.transition(SessionState::Idle);
        Some(draw)
    }

    // ==================== Ledger ====================

    /// Put a skipped participant back into the draw. Returns false if it was
    /// not excluded.
    pub fn reinstate(&mut self, id: &ParticipantId) -> Result<bool, SelectionError> {
        self.require_idle()?;
        let changed = self.ledger.reinstate(id);
        if changed {
            self.recompute_eligible();
            debug!(participant = %id, eligible = self.eligible.len(), "Participant reinstated");
        }
        Ok(changed)
    }

    /// Reinstate every skipped participant. Returns how many were reinstated.
    pub fn reinstate_all(&mut self) -> Result<usize, SelectionError> {
        self.require_idle()?;
        let count = self.ledger.len();
        if count > 0 {
            self.ledger.clear();
            self.recompute_eligible();
            debug!(count, "All skipped participants reinstated");
        }
        Ok(count)
    }

    // ==================== Remote reconciliation ====================

    /// Replace the pool snapshot and history from the remote system.
    ///
    /// Deferred while a decision is pending. Ledger exclusions survive.
    pub async fn request_refresh(&mut self) -> Result<RefreshOutcome, SelectionError> {
        if self.state.pending_draw().is_some() {
            self.refresh_deferred = true;
            debug!(state = %self.state, "Refresh deferred until the pending outcome resolves");
            return Ok(RefreshOutcome::Deferred);
        }
        self.require_idle()?;
        self.refresh_now().await?;
        Ok(RefreshOutcome::Applied)
    }

    /// Run a deferred refresh if one is recorded and no decision is pending.
    /// Returns whether a refresh ran.
    pub async fn flush_deferred_refresh(&mut self) -> Result<bool, SelectionError> {
        if !self.refresh_deferred || !self.state.is_idle() {
            return Ok(false);
        }
        self.refresh_now().await?;
        Ok(true)
    }

    /// Ask the remote system to clear the filter's selections, then refresh.
    pub async fn request_reset(&mut self) -> Result<(), SelectionError> {
        self.require_idle()?;

        if let Err(source) = self.client.request_reset(&self.filter).await {
            warn!(filter = %self.filter, error = %source, "Reset failed");
            return Err(SelectionError::collaborator(
                ClientOperation::RequestReset,
                source,
            ));
        }
        info!(filter = %self.filter, "Pool reset");

        self.ledger.clear();
        self.outcome = None;
        self.recompute_eligible();
        self.refresh_now().await
    }

    async fn refresh_now(&mut self) -> Result<(), SelectionError> {
        self.transition(SessionState::Refreshing);

        let (pool, history) = tokio::join!(
            self.client.fetch_pool(&self.filter),
            self.client.fetch_history()
        );
        let fetched = match (pool, history) {
            (Ok(pool), Ok(history)) => Ok((pool, history)),
            (Err(source), _) => Err(SelectionError::collaborator(
                ClientOperation::FetchPool,
                source,
            )),
            (_, Err(source)) => Err(SelectionError::collaborator(
                ClientOperation::FetchHistory,
                source,
            )),
        };

        let (pool, history) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping previous snapshot");
                self.transition(SessionState::Idle);
                return Err(e);
            }
        };

        let learned = self.catalog.observe(&pool);
        if learned > 0 {
            debug!(learned, "New filter categories observed");
        }
        self.pool = pool;
        self.history = history;
        self.refresh_deferred = false;
        self.recompute_eligible();
        self.date_index = history::aggregate(&self.history, &self.filter);

        info!(
            pool = self.pool.len(),
            eligible = self.eligible.len(),
            excluded = self.ledger.len(),
            days = self.date_index.len(),
            "Pool refreshed"
        );
        self.transition(SessionState::Idle);
        Ok(())
    }

    // ==================== Filters ====================

    /// Switch to another filter and persist it as the preferred one.
    ///
    /// Clears the ledger and the outcome, then recomputes against the existing
    /// snapshot. No network call is made.
    pub fn set_filter(&mut self, key: FilterKey) -> Result<(), SelectionError> {
        self.require_idle()?;
        if !self.catalog.contains(&key) {
            return Err(SelectionError::InvalidFilter(key.to_string()));
        }

        self.preferences.save(&Preferences {
            filter: Some(key.to_string()),
        })?;
        self.apply_filter(key);
        Ok(())
    }

    /// Parse `raw` against the catalog and switch to it
    pub fn select_filter(&mut self, raw: &str) -> Result<FilterKey, SelectionError> {
        let key = self.catalog.parse(raw)?;
        self.set_filter(key.clone())?;
        Ok(key)
    }

    fn apply_filter(&mut self, key: FilterKey) {
        info!(from = %self.filter, to = %key, "Filter switched");
        self.filter = key;
        self.ledger.clear();
        self.outcome = None;
        self.recompute_eligible();
        self.date_index = history::aggregate(&self.history, &self.filter);
    }

    // ==================== Internals ====================

    fn recompute_eligible(&mut self) {
        self.eligible = filter::eligible(&self.pool, &self.filter, &self.ledger);
    }

    fn take_awaiting(&self) -> Result<DrawResult, SelectionError> {
        match &self.state {
            SessionState::AwaitingConfirmation { draw } => Ok(draw.clone()),
            other => Err(SelectionError::InvalidState {
                expected: "AwaitingConfirmation".to_string(),
                actual: other.to_string(),
            }),
        }
    }

    fn require_idle(&self) -> Result<(), SelectionError> {
        if self.state.is_idle() {
            Ok(())
        } else {
            Err(SelectionError::InvalidState {
                expected: "Idle".to_string(),
                actual: self.state.to_string(),
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Session transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockReconciliationClient;
    use crate::error::ClientError;

    struct Sequence(Vec<usize>);

    impl RandomSource for Sequence {
        fn next_index(&mut self, _upper: usize) -> usize {
            if self.0.is_empty() { 0 } else { self.0.remove(0) }
        }
    }

    fn web() -> FilterKey {
        FilterKey::category("web")
    }

    fn abc() -> Vec<Participant> {
        vec![
            Participant::new("a", "A").with_tag("web"),
            Participant::new("b", "B").with_tag("web"),
            Participant::new("c", "C").with_tag("web"),
        ]
    }

    async fn started(client: Arc<MockReconciliationClient>, picks: Vec<usize>) -> SelectionSession {
        let mut session = SelectionSession::new(client)
            .with_rng(Sequence(picks))
            .with_preferences(MemoryPreferenceStore::with_filter("web"));
        session.start().await.unwrap();
        session
    }

    #[tokio::test]
    async fn start_restores_preferred_filter() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let session = started(client, vec![]).await;

        assert_eq!(session.filter(), &web());
        assert_eq!(session.eligible().len(), 3);
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn unknown_stored_filter_is_ignored() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = SelectionSession::new(client)
            .with_preferences(MemoryPreferenceStore::with_filter("marketing"));

        session.start().await.unwrap();

        assert_eq!(session.filter(), &FilterKey::All);
    }

    #[tokio::test]
    async fn draw_moves_to_awaiting_confirmation() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client, vec![1]).await;

        let result = session.request_draw().unwrap();

        assert_eq!(result.index, 1);
        assert_eq!(result.participant.name(), "B");
        assert_eq!(session.pending_draw(), Some(&result));
        assert_eq!(session.outcome(), Some(&result));
    }

    #[tokio::test]
    async fn abandon_leaves_pool_and_ledger_alone() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client.clone(), vec![0]).await;
        session.request_draw().unwrap();

        let dropped = session.abandon().unwrap();

        assert_eq!(dropped.participant.name(), "A");
        assert!(session.state().is_idle());
        assert_eq!(session.eligible().len(), 3);
        assert!(session.ledger().is_empty());
        assert!(client.commits().await.is_empty());
        assert!(session.abandon().is_none());
    }

    #[tokio::test]
    async fn confirm_without_pending_draw_is_invalid_state() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client, vec![]).await;

        let err = session.confirm().await.unwrap_err();
        assert!(matches!(err, SelectionError::InvalidState { .. }));
        assert!(session.reject().is_err());
    }

    #[tokio::test]
    async fn filter_switch_requires_known_key_and_clears_ledger() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client, vec![0]).await;
        session.request_draw().unwrap();
        session.reject().unwrap();
        assert_eq!(session.ledger().len(), 1);

        assert!(matches!(
            session.select_filter("design"),
            Err(SelectionError::InvalidFilter(_))
        ));

        session.select_filter("all").unwrap();
        assert!(session.ledger().is_empty());
        assert_eq!(session.eligible().len(), 3);
        assert!(session.outcome().is_none());
    }

    #[tokio::test]
    async fn set_filter_is_refused_while_deciding() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client, vec![0]).await;
        session.request_draw().unwrap();

        let err = session.set_filter(FilterKey::All).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidState { .. }));
        assert_eq!(session.filter(), &web());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let client = Arc::new(MockReconciliationClient::new(abc()));
        let mut session = started(client.clone(), vec![]).await;
        client.set_pool(vec![]).await;
        client
            .fail_next(
                ClientOperation::FetchHistory,
                ClientError::Transport("reset by peer".into()),
            )
            .await;

        let err = session.request_refresh().await.unwrap_err();

        assert_eq!(err.operation(), Some(ClientOperation::FetchHistory));
        assert_eq!(session.pool().len(), 3);
        assert!(session.state().is_idle());
    }
}
