use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "trainer.toml";
pub const CONFIG_PATH_ENV: &str = "MODEL_TRAINER_CONFIG";
pub const BASE_URL_ENV: &str = "MODEL_TRAINER_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TEST_SIZE: f64 = 0.2;
const DEFAULT_ALGORITHMS: &[&str] = &[
    "Logistic Regression",
    "Linear Regression",
    "Random Forest",
    "Decision Tree",
];

// ---------------------------------------------------------------------------
// Trainer configuration
// ---------------------------------------------------------------------------

/// Settings for talking to the training service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerConfig {
    /// Base URL of the training service; `/generate` is appended.
    pub base_url: String,
    /// Algorithm identifiers the deployment accepts, in display order.
    pub algorithms: Vec<String>,
    /// Held-out fraction sent along with each request.
    pub test_size: f64,
    /// Client-side request timeout. Unset means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            algorithms: DEFAULT_ALGORITHMS.iter().map(|s| s.to_string()).collect(),
            test_size: DEFAULT_TEST_SIZE,
            request_timeout_secs: None,
        }
    }
}

impl TrainerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// `base_url` without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must not be empty".into(),
            });
        }
        if self.algorithms.is_empty() || self.algorithms.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "algorithms",
                reason: "must list at least one non-empty identifier".into(),
            });
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::Invalid {
                field: "test_size",
                reason: format!("{} is not between 0 and 1", self.test_size),
            });
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Default location of the config file in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "model-trainer", "model-trainer")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Read and validate a config file. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<TrainerConfig, ConfigError> {
    if !path.exists() {
        return Ok(TrainerConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TrainerConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Resolve, load and override the configuration, falling back to defaults
/// on any error.
pub fn load() -> TrainerConfig {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .or_else(default_config_path);

    let config = match path {
        Some(path) => match load_from(&path) {
            Ok(config) => {
                log::info!("Using configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default configuration");
                TrainerConfig::default()
            }
        },
        None => TrainerConfig::default(),
    };

    config.with_env(|key| std::env::var(key).ok())
}
