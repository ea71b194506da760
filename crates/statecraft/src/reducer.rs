use crate::actions::Action;

/// Reducer - pure function that produces new state from an action and the current state
///
/// `state` is `None` exactly once: when the store was created without an initial
/// state and reduces the reserved [`Init`](crate::Init) action. Reducers must be
/// total and must never dispatch; a reducer that calls back into its own store
/// triggers the store's fatal hook.
///
/// Any `Fn(&dyn Action, Option<&S>) -> S` closure is a reducer.
pub trait Reducer<S>: Send + Sync + 'static {
    fn reduce(&self, action: &dyn Action, state: Option<&S>) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(&dyn Action, Option<&S>) -> S + Send + Sync + 'static,
{
    fn reduce(&self, action: &dyn Action, state: Option<&S>) -> S {
        self(action, state)
    }
}
