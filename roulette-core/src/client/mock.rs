//! In-memory collaborator for tests and offline runs
//!
//! Behaves like the remote system of record: commits flip the selected flag
//! and append a history outcome, resets clear flags, and an exhausted filter
//! can optionally auto-reset on the next pool fetch. Failures can be queued
//! per operation to exercise error paths.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use super::ReconciliationClient;
use crate::error::{ClientError, ClientOperation};
use crate::types::{FilterKey, HistoricalOutcome, Participant, ParticipantId};

#[derive(Debug, Default)]
struct MockState {
    pool: Vec<Participant>,
    history: Vec<HistoricalOutcome>,
    failures: HashMap<ClientOperation, VecDeque<ClientError>>,
    calls: HashMap<ClientOperation, usize>,
    commits: Vec<(ParticipantId, FilterKey)>,
    resets: Vec<FilterKey>,
    auto_resets: usize,
}

impl MockState {
    fn enter(&mut self, operation: ClientOperation) -> Result<(), ClientError> {
        *self.calls.entry(operation).or_default() += 1;
        match self
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn clear_filter(&mut self, filter: &FilterKey) {
        for participant in &mut self.pool {
            participant.clear_selected(filter);
        }
    }

    fn is_exhausted(&self, filter: &FilterKey) -> bool {
        !self
            .pool
            .iter()
            .any(|p| p.matches(filter) && !p.is_selected_under(filter))
    }
}

/// Scriptable implementation of [`ReconciliationClient`]
pub struct MockReconciliationClient {
    state: Mutex<MockState>,
    auto_reset: bool,
    today: NaiveDate,
}

impl MockReconciliationClient {
    /// Create a mock serving `pool` with empty history
    pub fn new(pool: Vec<Participant>) -> Self {
        Self {
            state: Mutex::new(MockState {
                pool,
                ..Default::default()
            }),
            auto_reset: false,
            today: Utc::now().date_naive(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoricalOutcome>) -> Self {
        self.state.get_mut().history = history;
        self
    }

    /// Reset an exhausted filter on the next pool fetch, like the remote service does
    #[must_use]
    pub fn with_auto_reset(mut self, enabled: bool) -> Self {
        self.auto_reset = enabled;
        self
    }

    /// Day recorded for outcomes appended by commits
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Queue an error for the next call of `operation`
    pub async fn fail_next(&self, operation: ClientOperation, error: ClientError) {
        self.state
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Replace the remote pool, as if someone edited it out of band
    pub async fn set_pool(&self, pool: Vec<Participant>) {
        self.state.lock().await.pool = pool;
    }

    pub async fn pool(&self) -> Vec<Participant> {
        self.state.lock().await.pool.clone()
    }

    pub async fn history(&self) -> Vec<HistoricalOutcome> {
        self.state.lock().await.history.clone()
    }

    /// Successful commits, in call order
    pub async fn commits(&self) -> Vec<(ParticipantId, FilterKey)> {
        self.state.lock().await.commits.clone()
    }

    /// Explicit resets, in call order
    pub async fn resets(&self) -> Vec<FilterKey> {
        self.state.lock().await.resets.clone()
    }

    pub async fn auto_resets(&self) -> usize {
        self.state.lock().await.auto_resets
    }

    /// Calls made to `operation`, failed ones included
    pub async fn call_count(&self, operation: ClientOperation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ReconciliationClient for MockReconciliationClient {
    async fn fetch_pool(&self, filter: &FilterKey) -> Result<Vec<Participant>, ClientError> {
        let mut state = self.state.lock().await;
        state.enter(ClientOperation::FetchPool)?;

        if self.auto_reset && !state.pool.is_empty() && state.is_exhausted(filter) {
            state.clear_filter(filter);
            state.auto_resets += 1;
        }

        Ok(state.pool.clone())
    }

    async fn fetch_history(&self) -> Result<Vec<HistoricalOutcome>, ClientError> {
        let mut state = self.state.lock().await;
        state.enter(ClientOperation::FetchHistory)?;
        Ok(state.history.clone())
    }

    async fn commit_selection(
        &self,
        id: &ParticipantId,
        filter: &FilterKey,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.enter(ClientOperation::CommitSelection)?;

        let at = self
            .today
            .and_hms_opt(9, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        let participant = state
            .pool
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| ClientError::Rejected {
                status: 404,
                message: format!("participant {id} not found"),
            })?;
        participant.mark_selected(filter, at);

        let mut outcome = HistoricalOutcome::new(participant.name(), self.today);
        if let FilterKey::Category(name) = filter {
            outcome = outcome.with_tag(name.clone());
        }
        state.history.push(outcome);
        state.commits.push((id.clone(), filter.clone()));
        Ok(())
    }

    async fn request_reset(&self, filter: &FilterKey) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.enter(ClientOperation::RequestReset)?;
        state.clear_filter(filter);
        state.resets.push(filter.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> FilterKey {
        FilterKey::category("web")
    }

    fn client() -> MockReconciliationClient {
        MockReconciliationClient::new(vec![
            Participant::new("a", "Ana").with_tag("web"),
            Participant::new("b", "Bea").with_tag("web"),
        ])
        .with_today(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[tokio::test]
    async fn commit_marks_flag_and_records_history() {
        let client = client();
        client.commit_selection(&"a".into(), &web()).await.unwrap();

        let pool = client.fetch_pool(&web()).await.unwrap();
        assert!(pool[0].is_selected_under(&web()));
        assert!(pool[0].last_selected_at().is_some());
        assert!(!pool[1].is_selected_under(&web()));

        let history = client.fetch_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Ana");
        assert!(history[0].tags.contains("web"));
    }

    #[tokio::test]
    async fn commit_of_unknown_id_is_rejected() {
        let client = client();
        let result = client.commit_selection(&"zz".into(), &web()).await;
        assert!(matches!(result, Err(ClientError::Rejected { status: 404, .. })));
        assert!(client.commits().await.is_empty());
    }

    #[tokio::test]
    async fn queued_failure_is_consumed_once() {
        let client = client();
        client
            .fail_next(
                ClientOperation::FetchPool,
                ClientError::Transport("timeout".into()),
            )
            .await;

        assert!(client.fetch_pool(&web()).await.is_err());
        assert!(client.fetch_pool(&web()).await.is_ok());
        assert_eq!(client.call_count(ClientOperation::FetchPool).await, 2);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let client = client();
        client.commit_selection(&"a".into(), &web()).await.unwrap();

        client.request_reset(&web()).await.unwrap();
        client.request_reset(&web()).await.unwrap();

        let pool = client.pool().await;
        assert!(pool.iter().all(|p| !p.is_selected_under(&web())));
        assert_eq!(client.resets().await.len(), 2);
    }

    #[tokio::test]
    async fn auto_reset_clears_exhausted_filter_on_fetch() {
        let client = client().with_auto_reset(true);
        client.commit_selection(&"a".into(), &web()).await.unwrap();
        client.commit_selection(&"b".into(), &web()).await.unwrap();

        let pool = client.fetch_pool(&web()).await.unwrap();

        assert!(pool.iter().all(|p| !p.is_selected_under(&web())));
        assert_eq!(client.auto_resets().await, 1);
    }
}
