//! Application-level configuration loading, including gameplay tunables and
//! the hint generation endpoint.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PHRASEOTOMY_BACK_CONFIG_PATH";

const DEFAULT_CLEANUP_DELAY_SECS: u64 = 30;
const DEFAULT_MAX_PLAYERS: u32 = 8;
const DEFAULT_HINT_TIMEOUT_MS: u64 = 4_000;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    cleanup_delay: Duration,
    max_players: u32,
    hint_endpoint: Option<String>,
    hint_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// How long to wait after game completion before purging session data.
    /// The window gives clients time to read the final scoreboard.
    pub fn cleanup_delay(&self) -> Duration {
        self.cleanup_delay
    }

    /// Maximum number of players allowed in one lobby.
    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    /// URL of the external hint generation service, when configured.
    pub fn hint_endpoint(&self) -> Option<&str> {
        self.hint_endpoint.as_deref()
    }

    /// Per-request timeout for hint generation calls.
    pub fn hint_timeout(&self) -> Duration {
        self.hint_timeout
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cleanup_delay: Duration::from_secs(DEFAULT_CLEANUP_DELAY_SECS),
            max_players: DEFAULT_MAX_PLAYERS,
            hint_endpoint: None,
            hint_timeout: Duration::from_millis(DEFAULT_HINT_TIMEOUT_MS),
        }
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    cleanup_delay_secs: Option<u64>,
    max_players: Option<u32>,
    hint_endpoint: Option<String>,
    hint_timeout_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            cleanup_delay: value
                .cleanup_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_delay),
            max_players: value.max_players.unwrap_or(defaults.max_players),
            hint_endpoint: value.hint_endpoint.filter(|url| !url.trim().is_empty()),
            hint_timeout: value
                .hint_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.hint_timeout),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"max_players": 4}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.max_players(), 4);
        assert_eq!(
            config.cleanup_delay(),
            Duration::from_secs(DEFAULT_CLEANUP_DELAY_SECS)
        );
        assert!(config.hint_endpoint().is_none());
    }

    #[test]
    fn blank_hint_endpoint_is_treated_as_unset() {
        let raw: RawConfig = serde_json::from_str(r#"{"hint_endpoint": "  "}"#).unwrap();
        let config: AppConfig = raw.into();
        assert!(config.hint_endpoint().is_none());
    }
}
