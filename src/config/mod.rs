//! Configuration loading and validation.
//!
//! Two files live here: the application config (`limitless.toml`, read-only
//! at runtime) and the UI preferences the CLI persists between runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::calculate::pipeline::SortConfig;
use crate::models::{DeckType, Format, StatsMode, GLOBAL_CONTEXT};
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Remote data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// PostgREST endpoint, e.g. `https://<project>.supabase.co/rest/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Anon key. Prefer `api_key_env` over storing it in the file.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout ("30s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Rows requested per PostgREST range
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "http://localhost:54321/rest/v1".to_string()
}

fn default_api_key_env() -> String {
    "LIMITLESS_API_KEY".to_string()
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_page_size() -> u32 {
    1000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.timeout).ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid source timeout: {:?}", self.timeout))
        })
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid source URL {:?}: {}", self.base_url, e))
        })
    }

    /// Key from the file, else from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            source: SourceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.source.url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "Source URL must be http(s), got {}",
                url.scheme()
            )));
        }

        if self.source.timeout()?.is_zero() {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.source.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "Source page size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Top-level view the CLI opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Decks,
    Cards,
    Blueprint,
    Balance,
    Power,
    Matrix,
}

/// Last-used selections, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub active_tab: Tab,
    pub set_code: String,
    pub format: Format,
    pub deck_type: DeckType,
    /// Card filter context ("Global" or a color code)
    pub archetype: String,
    pub stats_mode: StatsMode,
    pub sort: SortConfig,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            active_tab: Tab::default(),
            set_code: "TLA".to_string(),
            format: Format::PremierDraft,
            deck_type: DeckType::TwoColors,
            archetype: GLOBAL_CONTEXT.to_string(),
            stats_mode: StatsMode::default(),
            sort: SortConfig::default(),
        }
    }
}

impl Preferences {
    /// Load preferences; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No preferences at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        debug!("Saved preferences to {:?}", path);
        Ok(())
    }
}
