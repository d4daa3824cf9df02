//! CLI command implementations

pub mod list;
pub mod run;

use std::path::Path;

use crate::cli::error::CliError;
use crate::config::EnricherConfig;
use crate::registry::Registry;

/// Load `--config` if given, else `.prompt-enricher.toml` from the working directory
pub fn load_config(path: Option<&Path>) -> Result<EnricherConfig, CliError> {
    let config = match path {
        Some(path) => EnricherConfig::load_file(path, true)?,
        None => EnricherConfig::load(Path::new("."))?,
    };
    Ok(config)
}

/// Built-in registry minus the converters disabled in config
pub fn configured_registry(config: &EnricherConfig) -> Registry {
    let registry = Registry::builtin();
    if config.discovery.disabled.is_empty() {
        return registry;
    }
    for name in &config.discovery.disabled {
        if registry.get(name).is_none() {
            tracing::warn!("Disabled converter '{}' is not known", name);
        }
    }
    registry.without(&config.discovery.disabled)
}
