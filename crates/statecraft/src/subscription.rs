//! Subscription registry
//!
//! Subscribers are held through [`Weak`] references, so registering never keeps
//! a subscriber alive. Entries whose subscriber has been dropped are skipped
//! during a notification pass and pruned in one sweep once the pass is over.
//!
//! The registry is type-erased: each entry carries a delivery closure that
//! upgrades the weak reference, applies the optional projection and calls the
//! subscriber. The store keeps the registry behind a `RefCell` and never holds a
//! borrow while user code runs, so subscribers may subscribe, unsubscribe or
//! dispatch from inside their callback.
//!
//! A subscriber has at most one subscription per store, keyed by the address of
//! its `Arc`. Subscribing again, with or without a projection, is ignored; to
//! switch projections, unsubscribe first.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Observer notified with the store's state (or a projection of it) after every dispatch
///
/// A subscriber that dispatches from `new_state` triggers a nested notification
/// pass that runs to completion first. The outer pass then stops, so every
/// subscriber's last delivery is the newest state, but subscribers after the
/// dispatching one never see the intermediate state.
///
/// Any `Fn(&T) + Send + Sync` closure is a subscriber:
///
/// ```
/// use std::sync::Arc;
/// use statecraft::Subscriber;
///
/// let printer = Arc::new(|count: &u32| println!("count = {count}"));
/// printer.new_state(&3);
/// ```
pub trait Subscriber<T: ?Sized>: Send + Sync {
    fn new_state(&self, state: &T);
}

impl<T: ?Sized, F> Subscriber<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    fn new_state(&self, state: &T) {
        self(state)
    }
}

/// Identity of the allocation behind an `Arc`, used as the deduplication key
pub(crate) fn identity<T: ?Sized>(subscriber: &Arc<T>) -> usize {
    Arc::as_ptr(subscriber) as *const () as usize
}

type Deliver<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;
type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

/// A subscription that has been built but not yet added to a registry
pub(crate) struct Registration<S> {
    subscriber: usize,
    deliver: Deliver<S>,
    alive: Liveness,
}

impl<S: 'static> Registration<S> {
    /// Deliver the full state
    pub(crate) fn plain<Sub>(subscriber: &Arc<Sub>) -> Self
    where
        Sub: Subscriber<S> + ?Sized + 'static,
    {
        let weak = Arc::downgrade(subscriber);
        let probe = Weak::clone(&weak);
        Self {
            subscriber: identity(subscriber),
            deliver: Box::new(move |state: &S| match weak.upgrade() {
                Some(subscriber) => {
                    subscriber.new_state(state);
                    true
                }
                None => false,
            }),
            alive: Box::new(move || probe.strong_count() > 0),
        }
    }

    /// Deliver `projection(state)` instead of the full state
    pub(crate) fn projected<Sub, T, F>(subscriber: &Arc<Sub>, projection: F) -> Self
    where
        Sub: Subscriber<T> + ?Sized + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(subscriber);
        let probe = Weak::clone(&weak);
        Self {
            subscriber: identity(subscriber),
            deliver: Box::new(move |state: &S| match weak.upgrade() {
                Some(subscriber) => {
                    let substate = projection(state);
                    subscriber.new_state(&substate);
                    true
                }
                None => false,
            }),
            alive: Box::new(move || probe.strong_count() > 0),
        }
    }
}

/// One registry entry
pub(crate) struct Subscription<S> {
    id: u64,
    subscriber: usize,
    active: AtomicBool,
    deliver: Deliver<S>,
    alive: Liveness,
}

impl<S> Subscription<S> {
    /// Hand `state` to the subscriber. Returns `false` if the subscriber is gone.
    ///
    /// Entries removed while a notification pass is in flight are skipped.
    pub(crate) fn deliver(&self, state: &S) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return true;
        }
        (self.deliver)(state)
    }

    fn is_alive(&self) -> bool {
        (self.alive)()
    }
}

/// Ordered collection of subscriptions
pub(crate) struct SubscriptionRegistry<S> {
    entries: Vec<Arc<Subscription<S>>>,
    next_id: u64,
}

impl<S> SubscriptionRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Append a subscription unless the subscriber is already registered
    ///
    /// Returns the new entry, or `None` for a duplicate.
    pub(crate) fn add(&mut self, registration: Registration<S>) -> Option<Arc<Subscription<S>>> {
        if self.contains(registration.subscriber) {
            log::trace!("Ignoring duplicate subscription {:#x}", registration.subscriber);
            return None;
        }

        let entry = Arc::new(Subscription {
            id: self.next_id,
            subscriber: registration.subscriber,
            active: AtomicBool::new(true),
            deliver: registration.deliver,
            alive: registration.alive,
        });
        self.next_id += 1;
        self.entries.push(Arc::clone(&entry));
        Some(entry)
    }

    pub(crate) fn contains(&self, subscriber: usize) -> bool {
        self.entries.iter().any(|entry| entry.subscriber == subscriber)
    }

    /// Remove the entry of the given subscriber identity
    pub(crate) fn remove(&mut self, subscriber: usize) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            if entry.subscriber == subscriber {
                entry.active.store(false, Ordering::Release);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    /// Number of entries, including dead ones not pruned yet
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries whose subscriber is still alive
    pub(crate) fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_alive()).count()
    }

    fn prune(&mut self, dead: &[u64]) {
        self.entries.retain(|entry| !dead.contains(&entry.id));
    }

    /// Deliver `state` to every entry in insertion order, then prune dead entries
    ///
    /// `is_current` is checked before each delivery. Once it turns false (a
    /// subscriber dispatched and a newer pass already ran), the rest of this pass
    /// is skipped.
    ///
    /// The registry is only borrowed to take a snapshot and to prune, never while a
    /// subscriber runs.
    pub(crate) fn notify(registry: &RefCell<Self>, state: &S, is_current: impl Fn() -> bool) {
        let entries = registry.borrow().entries.clone();

        let mut dead = Vec::new();
        for entry in &entries {
            if !is_current() {
                log::trace!("Notification superseded by a nested dispatch");
                break;
            }
            if !entry.deliver(state) {
                dead.push(entry.id);
            }
        }

        if !dead.is_empty() {
            log::trace!("Pruning {} dead subscription(s)", dead.len());
            registry.borrow_mut().prune(&dead);
        }
    }
}
