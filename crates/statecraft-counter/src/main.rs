use anyhow::Context;
use statecraft::{BoxedAction, Store, StoreConfig};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

mod actions;
mod commands;
mod middleware;
mod reducer;
mod state;

use actions::{CounterAction, Rejected};
use commands::Command;
use middleware::bounds::BoundsMiddleware;
use state::CounterState;

const MIN_COUNT: i64 = -100;
const MAX_COUNT: i64 = 100;
const ASYNC_DELAY: Duration = Duration::from_millis(50);
const ASYNC_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let commands = commands::parse(std::env::args().skip(1))?;
    if commands.is_empty() {
        eprintln!("usage: statecraft-counter [inc|dec|reset|double|set <n>|later <n>|json <action>]...");
        return Ok(());
    }

    log::info!("Starting statecraft-counter");

    let config = StoreConfig::load();
    let store = Store::builder(reducer::reduce)
        .middleware(BoundsMiddleware::new(MIN_COUNT, MAX_COUNT))
        .config(&config)
        .build();

    // Subscribers are held weakly; keep them alive for the whole session
    let printer = Arc::new(|count: &i64| println!("count = {}", count));
    store.subscribe_with(&printer, |state: &CounterState| state.count);
    let tracer = Arc::new(|state: &CounterState| log::debug!("State: {:?}", state));
    store.subscribe(&tracer);

    for command in commands {
        run(&store, command)?;
    }

    let state = store.state();
    log::info!("Exiting with count {} after {} change(s)", state.count, state.changes);
    Ok(())
}

fn run(store: &Store<CounterState>, command: Command) -> anyhow::Result<()> {
    let result = match command {
        Command::Increment => store.dispatch(CounterAction::Increment),
        Command::Decrement => store.dispatch(CounterAction::Decrement),
        Command::Set(value) => store.dispatch(CounterAction::Set(value)),
        Command::Reset => store.dispatch(CounterAction::Reset),
        Command::Raw(action) => store.dispatch(action),
        Command::Double => {
            let result = store.dispatch_creator(|state, _| {
                Some(Box::new(CounterAction::Set(state.count.saturating_mul(2))) as BoxedAction)
            });
            result.context("double produced no action")?
        }
        Command::SetLater(value) => {
            set_later(store, value)?;
            return Ok(());
        }
    };

    if let Some(Rejected { count }) = result.downcast_ref::<Rejected>() {
        log::warn!("Rejected: count {} is at its bound", count);
    }
    Ok(())
}

/// Set the count from a background thread and wait until the store has applied it
fn set_later(store: &Store<CounterState>, value: i64) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel();

    store.dispatch_async_with_callback(
        |_, _, completion| {
            thread::spawn(move || {
                thread::sleep(ASYNC_DELAY);
                let update = completion
                    .complete(move |_, _| Some(Box::new(CounterAction::Set(value)) as BoxedAction));
                if let Err(e) = update {
                    log::error!("Async update failed ({}): {}", e.as_label(), e);
                }
            });
        },
        move |state: &CounterState| {
            let _ = tx.send(state.count);
        },
    );

    let count = rx
        .recv_timeout(ASYNC_TIMEOUT)
        .context("async update did not complete")?;
    log::debug!("Async update applied, count is {}", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_store() -> Store<CounterState> {
        Store::builder(reducer::reduce)
            .middleware(BoundsMiddleware::new(MIN_COUNT, MAX_COUNT))
            .build()
    }

    #[test]
    fn test_session() -> anyhow::Result<()> {
        let store = counter_store();
        let commands = commands::parse(["set", "3", "double", "inc", "later", "42", "dec"])?;

        for command in commands {
            run(&store, command)?;
        }

        assert_eq!(*store.state(), CounterState { count: 41, changes: 5 });
        Ok(())
    }

    #[test]
    fn test_double_is_bounded() -> anyhow::Result<()> {
        let store = counter_store();

        run(&store, Command::Set(80))?;
        run(&store, Command::Double)?;

        assert_eq!(store.state().count, MAX_COUNT);
        Ok(())
    }

    #[test]
    fn test_json_command() -> anyhow::Result<()> {
        let store = counter_store();

        for command in commands::parse(["json", r#"{"type":"set","payload":-7}"#, "json", r#"{"type":"increment"}"#])? {
            run(&store, command)?;
        }

        assert_eq!(store.state().count, -6);
        Ok(())
    }
}
