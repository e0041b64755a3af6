//! Application-level configuration loading, including eviction timings and
//! persistence paths.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAMBIT_BACK_CONFIG_PATH";

/// Sessions idle for longer than this are swept away.
const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(30 * 60);
/// How often the idle sweeper wakes up.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// Default path of the rating snapshot file.
const DEFAULT_RATINGS_PATH: &str = "data/ratings.json";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Inactivity span after which a session is evicted.
    pub idle_threshold: Duration,
    /// Period of the idle sweeper.
    pub sweep_interval: Duration,
    /// Where the rating ledger snapshot is written after every transaction.
    pub ratings_path: PathBuf,
    /// Optional path of the puzzle corpus CSV; `None` disables the `puzzle`
    /// command (the catalog stays empty).
    pub puzzles_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in
    /// defaults when the file is missing or unreadable.
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
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            ratings_path: PathBuf::from(DEFAULT_RATINGS_PATH),
            puzzles_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    idle_threshold_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
    ratings_path: Option<PathBuf>,
    puzzles_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            idle_threshold: value
                .idle_threshold_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_threshold),
            sweep_interval: value
                .sweep_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            ratings_path: value.ratings_path.unwrap_or(defaults.ratings_path),
            puzzles_path: value.puzzles_path,
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
