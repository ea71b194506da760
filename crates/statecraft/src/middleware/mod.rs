//! Middleware system
//!
//! Middleware sits between `dispatch` and the reducer. The store composes the
//! configured middleware once, at construction, into a single dispatch function:
//!
//! ```text
//! dispatch → middleware[0] → middleware[1] → ... → raw dispatch → reducer → subscribers
//! ```
//!
//! The first middleware is the outermost wrapper: it sees every action first and
//! every return value last. Each middleware can:
//! - Pass the action on unchanged (`next.run(action)`)
//! - Rewrite or replace the action before forwarding it
//! - Short-circuit by returning a value without calling `next`
//! - Dispatch other actions through the [`Dispatcher`], which run through the full
//!   chain and notify subscribers before the call returns
//!
//! ## Example
//!
//! ```
//! use statecraft::{Action, BoxedAction, DispatchResult, Dispatcher, Middleware, Next};
//!
//! #[derive(Debug)]
//! struct Ping;
//! impl Action for Ping {}
//!
//! struct SwallowPings;
//!
//! impl<S> Middleware<S> for SwallowPings {
//!     fn handle(&self, action: BoxedAction, _dispatcher: &Dispatcher<S>, next: &Next) -> DispatchResult {
//!         if action.is::<Ping>() {
//!             return Box::new("pong");
//!         }
//!         next.run(action)
//!     }
//! }
//! ```

use crate::actions::{Action, BoxedAction, DispatchResult};
use crate::dispatcher::Dispatcher;
use std::sync::Arc;

pub mod logging;

/// A link of the composed chain
pub(crate) type DispatchFn = Arc<dyn Fn(BoxedAction) -> DispatchResult + Send + Sync>;

/// The rest of the chain after the current middleware
///
/// The innermost `Next` is the store's raw dispatch: it runs the reducer,
/// replaces the state, notifies subscribers and returns the action.
#[derive(Clone)]
pub struct Next {
    inner: DispatchFn,
}

impl Next {
    pub(crate) fn new(inner: DispatchFn) -> Self {
        Self { inner }
    }

    /// Forward an action to the next link
    pub fn run(&self, action: BoxedAction) -> DispatchResult {
        (self.inner)(action)
    }

    /// Forward a freshly built action, typically a replacement for the current one
    pub fn run_action<A: Action>(&self, action: A) -> DispatchResult {
        self.run(Box::new(action))
    }
}

/// Middleware trait - intercepts actions on their way to the reducer
///
/// Middleware is shared by every dispatch of its store, including nested ones, so
/// `handle` takes `&self`. Keep mutable bookkeeping behind a lock.
///
/// Any `Fn(BoxedAction, &Dispatcher<S>, &Next) -> DispatchResult` is a middleware.
pub trait Middleware<S>: Send + Sync + 'static {
    /// Handle an action
    ///
    /// - `action`: The action to process
    /// - `dispatcher`: Dispatch other actions and read the current state
    /// - `next`: The rest of the chain
    ///
    /// Returns the value `dispatch` hands back to its caller.
    fn handle(&self, action: BoxedAction, dispatcher: &Dispatcher<S>, next: &Next) -> DispatchResult;
}

impl<S, F> Middleware<S> for F
where
    F: Fn(BoxedAction, &Dispatcher<S>, &Next) -> DispatchResult + Send + Sync + 'static,
{
    fn handle(&self, action: BoxedAction, dispatcher: &Dispatcher<S>, next: &Next) -> DispatchResult {
        self(action, dispatcher, next)
    }
}

/// Compose middleware right-to-left around `raw`
///
/// The result is `middleware[0]` wrapping `middleware[1]` wrapping ... wrapping `raw`.
pub(crate) fn compose<S: Send + Sync + 'static>(
    middleware: Vec<Box<dyn Middleware<S>>>,
    dispatcher: Dispatcher<S>,
    raw: DispatchFn,
) -> DispatchFn {
    middleware.into_iter().rev().fold(raw, |next, middleware| {
        let dispatcher = dispatcher.clone();
        let next = Next::new(next);
        let link: DispatchFn =
            Arc::new(move |action: BoxedAction| middleware.handle(action, &dispatcher, &next));
        link
    })
}
