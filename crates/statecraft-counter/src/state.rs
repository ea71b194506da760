/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    pub count: i64,
    /// Number of actions that changed the count
    pub changes: u64,
}
