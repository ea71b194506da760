use crate::actions::{CounterAction, Rejected};
use crate::reducer::counter_action;
use crate::state::CounterState;
use statecraft::{BoxedAction, DispatchResult, Dispatcher, Middleware, Next};

/// BoundsMiddleware - keeps the count within `min..=max`
///
/// - `Set` outside the range is clamped and forwarded
/// - `Increment`/`Decrement` that would leave the range are rejected: the
///   action never reaches the reducer and `dispatch` returns [`Rejected`]
#[derive(Debug, Clone, Copy)]
pub struct BoundsMiddleware {
    min: i64,
    max: i64,
}

impl BoundsMiddleware {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }
}

impl Middleware<CounterState> for BoundsMiddleware {
    fn handle(&self, action: BoxedAction, dispatcher: &Dispatcher<CounterState>, next: &Next) -> DispatchResult {
        let count = dispatcher.state().map_or(0, |state| state.count);

        match counter_action(&*action) {
            Some(CounterAction::Set(value)) if !(self.min..=self.max).contains(&value) => {
                let clamped = value.clamp(self.min, self.max);
                log::info!("Clamping {} to {}", value, clamped);
                next.run_action(CounterAction::Set(clamped))
            }
            Some(CounterAction::Increment) if count >= self.max => {
                log::info!("Rejecting increment at upper bound {}", self.max);
                Box::new(Rejected { count })
            }
            Some(CounterAction::Decrement) if count <= self.min => {
                log::info!("Rejecting decrement at lower bound {}", self.min);
                Box::new(Rejected { count })
            }
            _ => next.run(action),
        }
    }
}
