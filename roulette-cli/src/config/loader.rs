use super::types::{
    DEFAULT_BASE_URL, DEFAULT_REVEAL_DELAY_MS, DEFAULT_TIMEOUT_SECS, FiltersConfig,
    RawRemoteConfig, RawRouletteConfig, RawWheelConfig, RemoteConfig, RouletteConfig, WheelConfig,
};
use anyhow::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides `remote.token`
pub const TOKEN_ENV: &str = "ROULETTE_API_TOKEN";

/// Overrides the project config directory
pub const PROJECT_CONFIG_ENV: &str = "ROULETTE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + environment)
    pub fn load() -> Result<RouletteConfig> {
        let mut raw = RawRouletteConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        let config = Self::finalize(raw);
        Ok(Self::apply_env(config, std::env::var(TOKEN_ENV).ok()))
    }

    fn read_raw(path: &Path) -> Result<RawRouletteConfig> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "roulette").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with ROULETTE_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".roulette/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawRouletteConfig, overlay: RawRouletteConfig) -> RawRouletteConfig {
        RawRouletteConfig {
            remote: RawRemoteConfig {
                base_url: overlay.remote.base_url.or(base.remote.base_url),
                timeout_secs: overlay.remote.timeout_secs.or(base.remote.timeout_secs),
                token: overlay.remote.token.or(base.remote.token),
            },
            wheel: RawWheelConfig {
                reveal_delay_ms: overlay.wheel.reveal_delay_ms.or(base.wheel.reveal_delay_ms),
                auto_reset: overlay.wheel.auto_reset.or(base.wheel.auto_reset),
            },
            filters: FiltersConfig {
                categories: if overlay.filters.categories.is_empty() {
                    base.filters.categories
                } else {
                    overlay.filters.categories
                },
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawRouletteConfig) -> RouletteConfig {
        RouletteConfig {
            remote: RemoteConfig {
                base_url: raw
                    .remote
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout_secs: raw.remote.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                token: raw.remote.token,
            },
            wheel: WheelConfig {
                reveal_delay_ms: raw.wheel.reveal_delay_ms.unwrap_or(DEFAULT_REVEAL_DELAY_MS),
                auto_reset: raw.wheel.auto_reset.unwrap_or(true),
            },
            filters: raw.filters,
        }
    }

    /// A non-empty token from the environment replaces the configured one
    fn apply_env(mut config: RouletteConfig, env_token: Option<String>) -> RouletteConfig {
        if let Some(token) = env_token
            && !token.trim().is_empty()
        {
            config.remote.token = Some(token);
        }
        config
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<RouletteConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(RouletteConfig::default())
        }
    }
}
