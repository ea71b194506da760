//! Unidirectional data-flow state container
//!
//! This crate provides:
//! - A [`Store`] that owns a single state value and evolves it only through a [`Reducer`]
//! - A composable [`Middleware`] chain wrapped around the store's raw dispatch
//! - Weakly-held [`Subscriber`]s that are notified synchronously after every transition
//! - Action creators and asynchronous action creators with a completion handle
//!
//! # Example
//!
//! ```
//! use statecraft::{Action, Store};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Increment;
//! impl Action for Increment {}
//!
//! let store = Store::new(
//!     |action: &dyn Action, state: Option<&u32>| {
//!         let count = state.copied().unwrap_or_default();
//!         if action.is::<Increment>() { count + 1 } else { count }
//!     },
//!     None,
//!     Vec::new(),
//! );
//!
//! let printer = Arc::new(|count: &u32| println!("count = {count}"));
//! store.subscribe(&printer);
//! store.dispatch(Increment);
//! assert_eq!(*store.state(), 1);
//! ```

pub mod actions;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fatal;
pub mod middleware;
pub mod reducer;
pub mod store;
pub mod subscription;

pub use actions::{Action, BoxedAction, DispatchResult, Init, NoOp, StandardAction};
pub use config::StoreConfig;
pub use dispatcher::Dispatcher;
pub use error::{FatalError, StoreError};
pub use fatal::{FatalHandler, FatalPolicy, FatalRecorder};
pub use middleware::{Middleware, Next, logging::LoggingMiddleware};
pub use reducer::Reducer;
pub use store::{AsyncCompletion, Store, StoreBuilder, WeakStore};
pub use subscription::Subscriber;
