use crate::actions::CounterAction;
use crate::state::CounterState;
use statecraft::{Action, StandardAction};

/// Reducer - pure function that produces new state from current state + action
///
/// Starts from [`CounterState::default`] when the store has no state yet.
pub fn reduce(action: &dyn Action, state: Option<&CounterState>) -> CounterState {
    let mut state = state.cloned().unwrap_or_default();

    let Some(action) = counter_action(action) else {
        return state;
    };

    let count = match action {
        CounterAction::Increment => state.count.saturating_add(1),
        CounterAction::Decrement => state.count.saturating_sub(1),
        CounterAction::Set(value) => value,
        CounterAction::Reset => 0,
    };

    if count != state.count {
        state.count = count;
        state.changes += 1;
    }
    state
}

/// Typed view of `action`, if the counter understands it
pub fn counter_action(action: &dyn Action) -> Option<CounterAction> {
    if let Some(action) = action.downcast_ref::<CounterAction>() {
        return Some(*action);
    }

    let standard = action.downcast_ref::<StandardAction>()?;
    match standard.kind.as_str() {
        "increment" => Some(CounterAction::Increment),
        "decrement" => Some(CounterAction::Decrement),
        "reset" => Some(CounterAction::Reset),
        "set" => match standard.payload.as_ref().and_then(|payload| payload.as_i64()) {
            Some(value) => Some(CounterAction::Set(value)),
            None => {
                log::warn!("Ignoring set without a numeric payload: {:?}", standard.payload);
                None
            }
        },
        other => {
            log::debug!("Ignoring unknown action kind: {}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statecraft::{Init, NoOp};

    #[test]
    fn test_init_yields_default() {
        assert_eq!(reduce(&Init, None), CounterState::default());
    }

    #[test]
    fn test_counter_actions() {
        let state = CounterState { count: 5, changes: 0 };

        assert_eq!(reduce(&CounterAction::Increment, Some(&state)).count, 6);
        assert_eq!(reduce(&CounterAction::Decrement, Some(&state)).count, 4);
        assert_eq!(reduce(&CounterAction::Set(-3), Some(&state)).count, -3);
        assert_eq!(reduce(&CounterAction::Reset, Some(&state)).count, 0);
    }

    #[test]
    fn test_changes_only_count_real_changes() {
        let state = reduce(&CounterAction::Set(2), None);
        let state = reduce(&CounterAction::Set(2), Some(&state));
        let state = reduce(&NoOp, Some(&state));

        assert_eq!(state, CounterState { count: 2, changes: 1 });
    }

    #[test]
    fn test_standard_actions() {
        let state = CounterState { count: 1, changes: 0 };

        let incremented = reduce(&StandardAction::new("increment"), Some(&state));
        assert_eq!(incremented.count, 2);

        let set = StandardAction::with_payload("set", serde_json::json!(40));
        assert_eq!(reduce(&set, Some(&state)).count, 40);

        let broken = StandardAction::with_payload("set", serde_json::json!("forty"));
        assert_eq!(reduce(&broken, Some(&state)), state);

        assert_eq!(reduce(&StandardAction::new("jump"), Some(&state)), state);
    }
}
