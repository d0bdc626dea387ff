//! XDG Base Directory paths for roulette.
//!
//! The CLI uses XDG paths on every platform so the config location is the
//! same on macOS and Linux, like gh or kubectl.

use std::path::PathBuf;

/// Name of the file holding the persisted filter preference.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Get the roulette config directory.
///
/// Returns `$XDG_CONFIG_HOME/roulette` if set, otherwise `~/.config/roulette`.
///
/// # Examples
///
/// ```
/// use roulette_paths::config_dir;
///
/// let config = config_dir();
/// let file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("roulette")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/roulette")
    } else {
        PathBuf::from(".config/roulette")
    }
}

/// Path of the persisted preference file inside [`config_dir`].
pub fn preferences_path() -> PathBuf {
    config_dir().join(PREFERENCES_FILE)
}
