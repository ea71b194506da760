//! Dispatcher for middleware action dispatch
//!
//! Middleware never sees the store itself. It gets a Dispatcher: a narrow handle
//! that can dispatch actions back into the full middleware chain and read the
//! current state. The handle only holds a weak reference, so a middleware can
//! never keep its own store alive.
//!
//! This enables patterns like:
//! - Converting one action into another and swallowing the original
//! - Dispatching a follow-up action once the current state meets a condition

use crate::actions::{Action, BoxedAction, DispatchResult};
use crate::store::WeakStore;
use std::sync::Arc;

/// Dispatcher for sending actions through the middleware chain
///
/// Actions dispatched here re-enter the chain from the outermost middleware and
/// run to completion (reducer and subscribers included) before `dispatch` returns.
pub struct Dispatcher<S> {
    store: WeakStore<S>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Send + Sync + 'static> Dispatcher<S> {
    pub(crate) fn new(store: WeakStore<S>) -> Self {
        Self { store }
    }

    /// Dispatch an action through the whole middleware chain
    ///
    /// Returns `None` if the store has already been dropped.
    pub fn dispatch<A: Action>(&self, action: A) -> Option<DispatchResult> {
        self.dispatch_boxed(Box::new(action))
    }

    pub fn dispatch_boxed(&self, action: BoxedAction) -> Option<DispatchResult> {
        match self.store.upgrade() {
            Some(store) => Some(store.dispatch_boxed(action)),
            None => {
                log::error!("Dispatcher: store dropped, discarding {:?}", action);
                None
            }
        }
    }

    /// The store's state right now, including the effect of any nested dispatch
    /// that already finished
    pub fn state(&self) -> Option<Arc<S>> {
        self.store.upgrade().map(|store| store.state())
    }

    /// A non-owning handle to the store, for work that outlives this call
    pub fn store(&self) -> WeakStore<S> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::NoOp;

    #[test]
    fn test_detached_dispatcher_discards_actions() {
        let dispatcher = Dispatcher::<u32>::new(WeakStore::default());
        assert!(dispatcher.dispatch(NoOp).is_none());
        assert!(dispatcher.state().is_none());
        assert!(dispatcher.store().upgrade().is_none());
    }
}
