//! Configuration file support
//!
//! Handles parsing of `.prompt-enricher.toml` configuration files and
//! environment variable overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::{DEFAULT_CANARY, DiscoveryConfig};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".prompt-enricher.toml";

/// Default name of the column holding prompt text
pub const DEFAULT_TEXT_COLUMN: &str = "prompt";

/// Environment variable for the default probe budget, in seconds
pub const ENV_PROBE_TIMEOUT_SECS: &str = "PROMPT_ENRICHER_PROBE_TIMEOUT_SECS";

/// Environment variable for the prompt column name
pub const ENV_TEXT_COLUMN: &str = "PROMPT_ENRICHER_TEXT_COLUMN";

/// Environment variable for the canary text
pub const ENV_CANARY: &str = "PROMPT_ENRICHER_CANARY";

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Config error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Discovery configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySection {
    /// Text sent to every converter during its probe
    #[serde(default = "default_canary")]
    pub canary: String,

    /// Default probe budget in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: f64,

    /// Converters to leave out entirely
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Per-converter probe budgets in seconds
    #[serde(default)]
    pub timeouts: BTreeMap<String, f64>,
}

fn default_canary() -> String {
    DEFAULT_CANARY.to_string()
}

fn default_probe_timeout_secs() -> f64 {
    5.0
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            canary: default_canary(),
            probe_timeout_secs: default_probe_timeout_secs(),
            disabled: Vec::new(),
            timeouts: BTreeMap::new(),
        }
    }
}

/// Batch configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    /// Column holding the prompt text
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Directory for default-named output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_text_column() -> String {
    DEFAULT_TEXT_COLUMN.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            text_column: default_text_column(),
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.prompt-enricher.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnricherConfig {
    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub batch: BatchSection,
}

impl EnricherConfig {
    /// Load `.prompt-enricher.toml` from `dir`, falling back to defaults if absent
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        Self::load_file(&dir.join(CONFIG_FILENAME), false)
    }

    /// Load an explicit config file. Missing files are an error only when `required`.
    pub fn load_file(path: &Path, required: bool) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;
            Self::parse(&content)?
        } else if required {
            return Err(ConfigError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secs) = std::env::var(ENV_PROBE_TIMEOUT_SECS)
            && let Ok(secs) = secs.parse::<f64>()
        {
            self.discovery.probe_timeout_secs = secs;
        }

        if let Ok(column) = std::env::var(ENV_TEXT_COLUMN)
            && !column.is_empty()
        {
            self.batch.text_column = column;
        }

        if let Ok(canary) = std::env::var(ENV_CANARY)
            && !canary.trim().is_empty()
        {
            self.discovery.canary = canary;
        }
    }

    /// Reject values discovery cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        if self.discovery.canary.trim().is_empty() {
            return Err(ConfigError::ParseError(
                "discovery.canary must not be empty".to_string(),
            ));
        }
        let budgets = std::iter::once(("probe_timeout_secs", self.discovery.probe_timeout_secs))
            .chain(
                self.discovery
                    .timeouts
                    .iter()
                    .map(|(name, secs)| (name.as_str(), *secs)),
            );
        for (name, secs) in budgets {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::ParseError(format!(
                    "timeout for {} must be a positive number of seconds, got {}",
                    name, secs
                )));
            }
        }
        Ok(())
    }

    /// Discovery settings derived from this configuration
    pub fn discovery_config(&self, verbose: bool) -> DiscoveryConfig {
        DiscoveryConfig {
            canary: self.discovery.canary.clone(),
            probe_timeout: Duration::from_secs_f64(self.discovery.probe_timeout_secs),
            timeout_overrides: self
                .discovery
                .timeouts
                .iter()
                .map(|(name, secs)| (name.clone(), Duration::from_secs_f64(*secs)))
                .collect(),
            verbose,
        }
    }
}
