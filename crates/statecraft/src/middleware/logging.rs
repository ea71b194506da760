use crate::actions::{BoxedAction, DispatchResult, NoOp};
use crate::dispatcher::Dispatcher;
use crate::middleware::{Middleware, Next};

/// LoggingMiddleware - logs all actions passing through
///
/// Install it first so it sees every action, including ones later middleware
/// swallow or replace.
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    level: log::Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::with_level(log::Level::Debug)
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> log::Level {
        self.level
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Middleware<S> for LoggingMiddleware {
    fn handle(&self, action: BoxedAction, _dispatcher: &Dispatcher<S>, next: &Next) -> DispatchResult {
        // Skip NoOp to reduce noise
        if !action.is::<NoOp>() {
            log::log!(self.level, "Action: {:?}", action);
        }

        next.run(action)
    }
}
