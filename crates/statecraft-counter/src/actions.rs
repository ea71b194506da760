use statecraft::Action;

/// Actions the counter understands.
///
/// String-tagged [`StandardAction`](statecraft::StandardAction)s with the kinds
/// `increment`, `decrement`, `set` (numeric payload) and `reset` are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
    Set(i64),
    Reset,
}

impl Action for CounterAction {}

/// Returned by middleware in place of an action it refused to forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub count: i64,
}
