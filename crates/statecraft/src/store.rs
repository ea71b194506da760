use crate::actions::{Action, BoxedAction, DispatchResult, Init};
use crate::config::StoreConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{FatalError, StoreError};
use crate::fatal::{self, FatalHandler, FatalPolicy};
use crate::middleware::{self, DispatchFn, Middleware, logging::LoggingMiddleware};
use crate::reducer::Reducer;
use crate::subscription::{self, Registration, Subscriber, SubscriptionRegistry};
use parking_lot::{Mutex, ReentrantMutex};
use scopeguard::defer;
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Weak};

/// Store - holds the state and drives the dispatch loop
///
/// The Store follows the Redux pattern:
/// - A single state value, replaced (never mutated) on each dispatch
/// - Actions flow through the middleware chain into the reducer
/// - Subscribers are notified synchronously after every state change
///
/// `Store` is a cheap handle; clones share the same state. The store is dropped
/// when the last handle goes away. Middleware dispatchers, async completions and
/// subscriptions never keep it alive.
///
/// # Threads
///
/// All dispatches are serialized. A dispatch started on another thread waits
/// until the current one (including its nested dispatches and notifications) has
/// finished. Nested dispatch on the same thread, from middleware or subscribers,
/// runs immediately. Subscribers and middleware therefore must not block on
/// another thread that dispatches to the same store.
pub struct Store<S> {
    inner: Arc<Inner<S>>,
}

/// Non-owning handle to a [`Store`]
pub struct WeakStore<S> {
    inner: Weak<Inner<S>>,
}

struct Inner<S> {
    core: ReentrantMutex<Core<S>>,
    reducer: Box<dyn Reducer<S>>,
    chain: DispatchFn,
    fatal: FatalHandler,
}

/// Everything guarded by the dispatch lock
struct Core<S> {
    state: RefCell<Arc<S>>,
    /// Bumped on every state replacement
    version: Cell<u64>,
    reducing: Cell<bool>,
    subscriptions: RefCell<SubscriptionRegistry<S>>,
}

type StateCallback<S> = Box<dyn FnOnce(&S) + Send>;

impl<S: Send + Sync + 'static> Store<S> {
    /// Create a store
    ///
    /// Without an initial state, the reducer is called once with [`Init`] and
    /// `None` to produce one. `middleware[0]` is the outermost middleware.
    pub fn new<R: Reducer<S>>(
        reducer: R,
        state: Option<S>,
        middleware: Vec<Box<dyn Middleware<S>>>,
    ) -> Self {
        let mut builder = Self::builder(reducer).middlewares(middleware);
        builder.state = state;
        builder.build()
    }

    pub fn builder<R: Reducer<S>>(reducer: R) -> StoreBuilder<S> {
        StoreBuilder {
            reducer: Box::new(reducer),
            state: None,
            middleware: Vec::new(),
            fatal: None,
            fatal_policy: None,
            action_log_level: None,
        }
    }

    /// Get the current state
    pub fn state(&self) -> Arc<S> {
        let core = self.inner.core.lock();
        let state = Arc::clone(&core.state.borrow());
        state
    }

    /// Dispatch an action through the middleware chain and reducer
    ///
    /// Returns whatever the outermost middleware returns; without middleware
    /// that is the action itself.
    pub fn dispatch<A: Action>(&self, action: A) -> DispatchResult {
        self.dispatch_boxed(Box::new(action))
    }

    pub fn dispatch_boxed(&self, action: BoxedAction) -> DispatchResult {
        self.inner.dispatch(action)
    }

    /// Run an action creator against the current state and dispatch what it produces
    ///
    /// Returns `None` when the creator produced no action. The state read and the
    /// dispatch happen under the dispatch lock, so no other thread can change the
    /// state in between.
    pub fn dispatch_creator<F>(&self, creator: F) -> Option<DispatchResult>
    where
        F: FnOnce(&S, &Store<S>) -> Option<BoxedAction>,
    {
        let _serial = self.inner.core.lock();
        let state = self.state();
        match creator(&state, self) {
            Some(action) => Some(self.dispatch_boxed(action)),
            None => {
                log::trace!("Action creator produced no action");
                None
            }
        }
    }

    /// Start an asynchronous action creator
    ///
    /// The creator receives the current state, the store and an
    /// [`AsyncCompletion`] it can move to another thread and complete later.
    pub fn dispatch_async<F>(&self, creator: F)
    where
        F: FnOnce(&S, &Store<S>, AsyncCompletion<S>),
    {
        self.start_async(creator, None);
    }

    /// Like [`dispatch_async`](Self::dispatch_async), with a callback that fires
    /// exactly once, right after the first asynchronously produced action has been
    /// reduced and all subscribers were notified
    pub fn dispatch_async_with_callback<F, C>(&self, creator: F, callback: C)
    where
        F: FnOnce(&S, &Store<S>, AsyncCompletion<S>),
        C: FnOnce(&S) + Send + 'static,
    {
        self.start_async(creator, Some(Box::new(callback)));
    }

    fn start_async<F>(&self, creator: F, callback: Option<StateCallback<S>>)
    where
        F: FnOnce(&S, &Store<S>, AsyncCompletion<S>),
    {
        let completion = AsyncCompletion {
            store: self.downgrade(),
            callback: Arc::new(Mutex::new(callback)),
        };
        let state = self.state();
        creator(&state, self, completion);
    }

    /// Subscribe to the full state
    ///
    /// The subscriber is held weakly and immediately receives the current state.
    /// Subscribing the same subscriber twice is a no-op.
    pub fn subscribe<Sub>(&self, subscriber: &Arc<Sub>)
    where
        Sub: Subscriber<S> + ?Sized + 'static,
    {
        self.register(Registration::plain(subscriber));
    }

    /// Subscribe to a projection of the state
    ///
    /// A subscriber has at most one subscription: if it is already subscribed,
    /// with or without a projection, this is a no-op. Unsubscribe first to switch
    /// to a different projection.
    pub fn subscribe_with<Sub, T, F>(&self, subscriber: &Arc<Sub>, projection: F)
    where
        Sub: Subscriber<T> + ?Sized + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.register(Registration::projected(subscriber, projection));
    }

    fn register(&self, registration: Registration<S>) {
        let core = self.inner.core.lock();
        let added = core.subscriptions.borrow_mut().add(registration);
        if let Some(entry) = added {
            let state = Arc::clone(&core.state.borrow());
            entry.deliver(&state);
        }
    }

    /// Remove every subscription of `subscriber`. Unknown subscribers are ignored.
    pub fn unsubscribe<Sub: ?Sized>(&self, subscriber: &Arc<Sub>) {
        let core = self.inner.core.lock();
        let removed = core
            .subscriptions
            .borrow_mut()
            .remove(subscription::identity(subscriber));
        log::trace!("Unsubscribed {} subscription(s)", removed);
    }

    /// Registered subscriptions, including ones whose subscriber was dropped
    /// since the last notification
    pub fn subscription_count(&self) -> usize {
        let core = self.inner.core.lock();
        let count = core.subscriptions.borrow().len();
        count
    }

    /// Registered subscriptions whose subscriber is still alive
    pub fn live_subscriber_count(&self) -> usize {
        let core = self.inner.core.lock();
        let count = core.subscriptions.borrow().live_count();
        count
    }

    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Send + Sync + 'static> Inner<S> {
    fn dispatch(&self, action: BoxedAction) -> DispatchResult {
        let core = self.core.lock();
        if core.reducing.get() {
            let error = FatalError::ReentrantDispatch {
                action: format!("{:?}", action),
            };
            (self.fatal)(&error);
            log::warn!("Discarded {:?} dispatched from inside the reducer", action);
            return action.into_result();
        }

        (self.chain)(action)
    }

    /// Innermost link of the chain
    fn reduce_and_notify(&self, action: BoxedAction) -> DispatchResult {
        let core = self.core.lock();
        let current = Arc::clone(&core.state.borrow());

        let next = {
            core.reducing.set(true);
            defer! {
                core.reducing.set(false);
            }
            self.reducer.reduce(&*action, Some(&*current))
        };

        let next = Arc::new(next);
        core.state.replace(Arc::clone(&next));
        let version = core.version.get().wrapping_add(1);
        core.version.set(version);
        log::trace!("Reduced {:?}", action);

        SubscriptionRegistry::notify(&core.subscriptions, &next, || {
            core.version.get() == version
        });
        action.into_result()
    }
}

impl<S> WeakStore<S> {
    pub fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// A handle that was never attached to a store
impl<S> Default for WeakStore<S> {
    fn default() -> Self {
        Self { inner: Weak::new() }
    }
}

/// Completion handle passed to asynchronous action creators
///
/// Clone it freely and move it to any thread. Each [`complete`](Self::complete)
/// runs an action creator through the store.
pub struct AsyncCompletion<S> {
    store: WeakStore<S>,
    callback: Arc<Mutex<Option<StateCallback<S>>>>,
}

impl<S> Clone for AsyncCompletion<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<S: Send + Sync + 'static> AsyncCompletion<S> {
    /// Run `creator` and dispatch the action it produces
    ///
    /// The first call that produces an action also fires the callback given to
    /// [`Store::dispatch_async_with_callback`], with the state right after that
    /// dispatch. Fails with [`StoreError::StoreDropped`] if the store is gone.
    pub fn complete<F>(&self, creator: F) -> Result<(), StoreError>
    where
        F: FnOnce(&S, &Store<S>) -> Option<BoxedAction>,
    {
        let store = self.store.upgrade().ok_or(StoreError::StoreDropped)?;
        let _serial = store.inner.core.lock();

        if store.dispatch_creator(creator).is_some() {
            let callback = self.callback.lock().take();
            if let Some(callback) = callback {
                let state = store.state();
                callback(&state);
            }
        }
        Ok(())
    }
}

/// Builder for [`Store`]
pub struct StoreBuilder<S> {
    reducer: Box<dyn Reducer<S>>,
    state: Option<S>,
    middleware: Vec<Box<dyn Middleware<S>>>,
    fatal: Option<FatalHandler>,
    fatal_policy: Option<FatalPolicy>,
    action_log_level: Option<log::Level>,
}

impl<S: Send + Sync + 'static> StoreBuilder<S> {
    /// Start from this state instead of reducing [`Init`]
    pub fn state(mut self, state: S) -> Self {
        self.state = Some(state);
        self
    }

    /// Append a middleware; the first one added is the outermost
    pub fn middleware<M: Middleware<S>>(mut self, middleware: M) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn middlewares(mut self, middleware: Vec<Box<dyn Middleware<S>>>) -> Self {
        self.middleware.extend(middleware);
        self
    }

    /// Hook for fatal programming errors. Defaults to [`fatal::abort_handler`].
    ///
    /// Takes precedence over the policy of any [`config`](Self::config), whichever
    /// is called first.
    pub fn fatal_handler(mut self, handler: FatalHandler) -> Self {
        self.fatal = Some(handler);
        self
    }

    /// Apply a [`StoreConfig`]: fatal policy and optional action logging
    ///
    /// The config's fatal policy only applies when no explicit
    /// [`fatal_handler`](Self::fatal_handler) is set.
    pub fn config(mut self, config: &StoreConfig) -> Self {
        self.fatal_policy = Some(config.on_fatal);
        self.action_log_level = config.log_actions.then_some(config.action_log_level);
        self
    }

    pub fn build(self) -> Store<S> {
        let StoreBuilder {
            reducer,
            state,
            mut middleware,
            fatal,
            fatal_policy,
            action_log_level,
        } = self;

        let fatal = fatal.unwrap_or_else(|| fatal_policy.unwrap_or_default().handler());

        if let Some(level) = action_log_level {
            middleware.insert(0, Box::new(LoggingMiddleware::with_level(level)));
        }

        let state = match state {
            Some(state) => state,
            None => {
                log::debug!("No initial state given, reducing Init");
                reducer.reduce(&Init, None)
            }
        };

        let middleware_count = middleware.len();
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<S>>| {
            let raw: DispatchFn = {
                let weak = Weak::clone(weak);
                Arc::new(move |action: BoxedAction| match weak.upgrade() {
                    Some(inner) => inner.reduce_and_notify(action),
                    None => action.into_result(),
                })
            };
            let dispatcher = Dispatcher::new(WeakStore {
                inner: Weak::clone(weak),
            });

            Inner {
                core: ReentrantMutex::new(Core {
                    state: RefCell::new(Arc::new(state)),
                    version: Cell::new(0),
                    reducing: Cell::new(false),
                    subscriptions: RefCell::new(SubscriptionRegistry::new()),
                }),
                reducer,
                chain: middleware::compose(middleware, dispatcher, raw),
                fatal,
            }
        });

        log::debug!("Store created with {} middleware", middleware_count);
        Store { inner }
    }
}
