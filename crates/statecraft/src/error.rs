//! Error types used by the store.
//!
//! - [`StoreError`]: recoverable failures returned to the caller
//! - [`FatalError`]: programming errors routed through the store's fatal hook

use std::path::PathBuf;
use thiserror::Error;

/// Recoverable errors produced by the store and its configuration
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// A weak handle (async completion, middleware dispatcher) outlived its store.
    #[error("store has been dropped")]
    StoreDropped,

    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`StoreConfig`](crate::StoreConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::StoreDropped => "store_dropped",
            StoreError::ConfigRead { .. } => "config_read",
            StoreError::ConfigParse(_) => "config_parse",
        }
    }
}

/// Unrecoverable programming errors.
///
/// These are never returned; they are handed to the store's
/// [`FatalHandler`](crate::FatalHandler), which aborts by default.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// The reducer called back into `dispatch` while it was still running.
    #[error("reducers may not dispatch actions (dispatched {action} while reducing)")]
    ReentrantDispatch {
        /// Debug rendering of the action the reducer tried to dispatch.
        action: String,
    },
}

impl FatalError {
    pub fn as_label(&self) -> &'static str {
        match self {
            FatalError::ReentrantDispatch { .. } => "reentrant_dispatch",
        }
    }
}
