//! reqwest-backed reconciliation client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use roulette_core::client::wire::{self, CommitRequest, HistoryEntry, PoolEntry, ResetRequest};
use roulette_core::{
    ClientError, FilterKey, HistoricalOutcome, Participant, ParticipantId, ReconciliationClient,
};

use crate::{ApiToken, Error, Result};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder for [`HttpReconciliationClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    base_url: String,
    token: Option<ApiToken>,
    timeout: Duration,
}

impl HttpClientBuilder {
    /// Attach a bearer token to every request.
    pub fn token(mut self, token: impl Into<ApiToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn maybe_token(mut self, token: Option<ApiToken>) -> Self {
        self.token = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpReconciliationClient> {
        let base_url = normalize_base(&self.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(HttpReconciliationClient {
            base_url,
            token: self.token,
            client,
        })
    }
}

/// Parse the base URL and make sure relative joins append to its path.
fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot carry a path".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// ────────────────────────────────────────────────────────────────────────────
// HttpReconciliationClient
// ────────────────────────────────────────────────────────────────────────────

/// Talks to the participants service over HTTP.
pub struct HttpReconciliationClient {
    base_url: Url,
    token: Option<ApiToken>,
    client: reqwest::Client,
}

impl HttpReconciliationClient {
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ClientError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match body.trim() {
            "" => status.canonical_reason().unwrap_or("unknown status").to_string(),
            text => text.to_string(),
        };
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
    ) -> std::result::Result<T, ClientError> {
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ReconciliationClient for HttpReconciliationClient {
    async fn fetch_pool(
        &self,
        filter: &FilterKey,
    ) -> std::result::Result<Vec<Participant>, ClientError> {
        let mut url = self.endpoint("participants")?;
        url.query_pairs_mut().append_pair("filter", filter.as_str());
        debug!(%url, "Fetching pool");

        let response = self.send(self.client.get(url)).await?;
        let entries: Vec<PoolEntry> = Self::decode(response).await?;
        let pool = wire::decode_pool(entries)?;
        debug!(count = pool.len(), %filter, "Pool fetched");
        Ok(pool)
    }

    async fn fetch_history(&self) -> std::result::Result<Vec<HistoricalOutcome>, ClientError> {
        let url = self.endpoint("history")?;
        debug!(%url, "Fetching history");

        let response = self.send(self.client.get(url)).await?;
        let entries: Vec<HistoryEntry> = Self::decode(response).await?;
        let history = wire::decode_history(entries)?;
        debug!(count = history.len(), "History fetched");
        Ok(history)
    }

    async fn commit_selection(
        &self,
        id: &ParticipantId,
        filter: &FilterKey,
    ) -> std::result::Result<(), ClientError> {
        let url = self.endpoint("participants")?;
        debug!(%url, participant = %id, %filter, "Committing selection");

        let body = CommitRequest::new(id, filter);
        self.send(self.client.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn request_reset(&self, filter: &FilterKey) -> std::result::Result<(), ClientError> {
        let url = self.endpoint("participants/reset")?;
        debug!(%url, %filter, "Requesting reset");

        let body = ResetRequest::new(filter);
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}
