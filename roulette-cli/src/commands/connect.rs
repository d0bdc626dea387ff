//! Builds a started selection session from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use roulette_core::{FilterCatalog, JsonPreferenceStore, SelectionSession, StdRandom};
use roulette_remote::{ApiToken, HttpReconciliationClient};

use crate::config::{ConfigLoader, RouletteConfig};

/// Filter selection shared by the session commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArg {
    /// Filter to use instead of the preferred one (becomes the new preference)
    #[arg(short, long, value_name = "KEY")]
    pub filter: Option<String>,
}

/// Load config, connect to the service and run the initial refresh.
pub async fn open(
    server: Option<String>,
    filter: &FilterArg,
    seed: Option<u64>,
) -> Result<(SelectionSession, RouletteConfig)> {
    let config = ConfigLoader::load()?;
    let session = connect(&config, server, filter, seed).await?;
    Ok((session, config))
}

async fn connect(
    config: &RouletteConfig,
    server: Option<String>,
    filter: &FilterArg,
    seed: Option<u64>,
) -> Result<SelectionSession> {
    let base_url = server.unwrap_or_else(|| config.remote.base_url.clone());
    let client = HttpReconciliationClient::builder(&base_url)
        .maybe_token(config.remote.token.clone().map(ApiToken::new))
        .timeout(Duration::from_secs(config.remote.timeout_secs))
        .build()?;
    debug!(%base_url, authenticated = client.has_token(), "Connecting");

    let rng = match seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    let preferences = JsonPreferenceStore::new(roulette_paths::preferences_path());

    let mut session = SelectionSession::new(Arc::new(client))
        .with_rng(rng)
        .with_preferences(preferences)
        .with_catalog(FilterCatalog::with_categories(
            config.filters.categories.iter().cloned(),
        ));
    session
        .start()
        .await
        .with_context(|| format!("Could not reach the participants service at {base_url}"))?;

    if let Some(raw) = &filter.filter {
        let previous = session.filter().clone();
        let key = session.select_filter(raw)?;
        if key != previous {
            session
                .request_refresh()
                .await
                .with_context(|| format!("Could not refresh the pool under '{key}'"))?;
        }
    }
    Ok(session)
}
