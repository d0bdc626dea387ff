use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRouletteConfig {
    #[serde(default)]
    pub remote: RawRemoteConfig,

    #[serde(default)]
    pub wheel: RawWheelConfig,

    #[serde(default)]
    pub filters: FiltersConfig,
}

/// Remote config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRemoteConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWheelConfig {
    pub reveal_delay_ms: Option<u64>,
    pub auto_reset: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouletteConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub wheel: WheelConfig,

    #[serde(default)]
    pub filters: FiltersConfig,
}

impl RouletteConfig {
    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.remote.token.is_some() {
            config.remote.token = Some(REDACTED.to_string());
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Participants service, e.g. `http://localhost:3000/api`
    pub base_url: String,

    pub timeout_secs: u64,

    /// Bearer token; `ROULETTE_API_TOKEN` takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Pause between the spin and the reveal
    pub reveal_delay_ms: u64,

    /// Reset the pool when everyone under the filter has been picked
    pub auto_reset: bool,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            auto_reset: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FiltersConfig {
    /// Categories offered even before the pool has been fetched
    #[serde(default)]
    pub categories: Vec<String>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 3000;
const REDACTED: &str = "[REDACTED]";
