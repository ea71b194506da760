//! Store configuration
//!
//! Configuration loaded from a `.statecraft.toml` file.

use crate::error::StoreError;
use crate::fatal::FatalPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".statecraft.toml";

/// Store configuration loaded from `.statecraft.toml`
///
/// Apply it with [`StoreBuilder::config`](crate::StoreBuilder::config).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Prepend a [`LoggingMiddleware`](crate::LoggingMiddleware) to the chain
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,

    /// Level the logging middleware logs actions at
    #[serde(default = "default_action_log_level")]
    pub action_log_level: log::Level,

    /// What happens when the store detects a programming error
    #[serde(default)]
    pub on_fatal: FatalPolicy,
}

fn default_log_actions() -> bool {
    true
}

fn default_action_log_level() -> log::Level {
    log::Level::Debug
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_actions: default_log_actions(),
            action_log_level: default_action_log_level(),
            on_fatal: FatalPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        for path in config_paths() {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    log::info!("Loaded store config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring store config ({}): {}", e.as_label(), e);
                }
            }
        }

        log::debug!("Using default store config");
        Self::default()
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(content)?)
    }
}

/// Candidate config files, in lookup order
fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_FILE));
    }
    paths
}
