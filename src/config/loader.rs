use super::types::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store '{0}' not found")]
    StoreNotFound(String),

    #[error("Store '{store}': invalid datetime pattern '{pattern}': {source}")]
    InvalidPattern {
        store: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("Store '{store}': root directory does not exist: {root:?}")]
    RootMissing { store: String, root: PathBuf },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.stores.is_empty() {
        return Err(ConfigError::ValidationError(
            "No stores defined".to_string(),
        ));
    }

    // The global pattern applies to every store without an override.
    compile_pattern("global", &config.global.datetime_pattern)?;

    for (name, store) in &config.stores {
        validate_store(name, store)?;
    }

    Ok(())
}

fn validate_store(name: &str, store: &StoreConfig) -> Result<()> {
    if store.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Store '{}': root must not be empty",
            name
        )));
    }

    if let Some(ref pattern) = store.datetime_pattern {
        compile_pattern(name, pattern)?;
    }

    // Catch missing roots at validation time instead of at the first list.
    let root = super::expand_tilde(&store.root);
    if !root.is_dir() {
        return Err(ConfigError::RootMissing {
            store: name.to_string(),
            root,
        });
    }

    Ok(())
}

fn compile_pattern(store: &str, pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        store: store.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

/// Resolve a store configuration by merging with global defaults
pub fn resolve_store(name: &str, store: &StoreConfig, config: &Config) -> ResolvedStoreConfig {
    let datetime_pattern = store
        .datetime_pattern
        .clone()
        .unwrap_or_else(|| config.global.datetime_pattern.clone());

    ResolvedStoreConfig {
        name: name.to_string(),
        root: store.root.clone(),
        prefix: store.prefix.clone(),
        datetime_pattern,
        description: store.description.clone(),
        enabled: store.enabled,
    }
}

/// Resolve all stores in the configuration
pub fn resolve_all_stores(config: &Config) -> HashMap<String, ResolvedStoreConfig> {
    config
        .stores
        .iter()
        .map(|(name, store)| (name.clone(), resolve_store(name, store, config)))
        .collect()
}
