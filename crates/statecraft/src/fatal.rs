//! Fatal error reporting
//!
//! A store reports unrecoverable programming errors (see [`FatalError`]) through an
//! injectable hook instead of aborting directly. Production stores abort; test
//! harnesses install a [`FatalRecorder`] to assert that the fatal path fired
//! without killing the test process.

use crate::error::FatalError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Hook invoked with every fatal error a store detects.
///
/// If the hook returns, the offending operation is skipped and the store carries
/// on with its previous state.
pub type FatalHandler = Arc<dyn Fn(&FatalError) + Send + Sync>;

/// Which fatal hook a store built from [`StoreConfig`](crate::StoreConfig) installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatalPolicy {
    /// Log and abort the process
    #[default]
    Abort,
    /// Log and panic on the offending thread
    Panic,
}

impl FatalPolicy {
    pub fn handler(self) -> FatalHandler {
        match self {
            FatalPolicy::Abort => abort_handler(),
            FatalPolicy::Panic => panic_handler(),
        }
    }
}

/// Default hook: log the error and abort the process
pub fn abort_handler() -> FatalHandler {
    Arc::new(|error: &FatalError| {
        log::error!("fatal store error ({}): {}", error.as_label(), error);
        eprintln!("fatal store error: {}", error);
        std::process::abort();
    })
}

pub fn panic_handler() -> FatalHandler {
    Arc::new(|error: &FatalError| {
        log::error!("fatal store error ({}): {}", error.as_label(), error);
        panic!("fatal store error: {}", error);
    })
}

/// Records fatal errors and returns, so callers can assert on them
///
/// # Example
///
/// ```
/// use statecraft::{Action, FatalRecorder, Store};
///
/// let recorder = FatalRecorder::new();
/// let store = Store::builder(|_: &dyn Action, state: Option<&u8>| state.copied().unwrap_or(0))
///     .fatal_handler(recorder.handler())
///     .build();
/// assert!(recorder.errors().is_empty());
/// # drop(store);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FatalRecorder {
    errors: Arc<Mutex<Vec<FatalError>>>,
}

impl FatalRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook that appends to this recorder
    pub fn handler(&self) -> FatalHandler {
        let errors = Arc::clone(&self.errors);
        Arc::new(move |error: &FatalError| {
            log::warn!("recorded fatal store error: {}", error);
            errors.lock().push(error.clone());
        })
    }

    /// Snapshot of everything recorded so far
    pub fn errors(&self) -> Vec<FatalError> {
        self.errors.lock().clone()
    }
}
