//! Line-driven counter: each input line is a key name (`ArrowUp`, `+`, `-`,
//! `r`, ...) or a button id (`increase`, `decrease`, `reset`). `q` quits.
//!
//! The value is saved to `counter.json` (or the path given as the first
//! argument) and restored on the next run. Set `RUST_LOG=debug` to see pulse
//! events.

use std::io::BufRead;
use tally::{CounterConfig, CounterStore, FileStorage, LogDisplay, TokioScheduler};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "counter.json".to_string());
    let config = CounterConfig::load("counter.config.json")?;

    // Pulse clears run on the runtime's workers while this thread reads stdin.
    let runtime = tokio::runtime::Runtime::new()?;
    let mut counter = CounterStore::open(
        config,
        FileStorage::open(&path)?,
        LogDisplay::new("demo"),
        TokioScheduler::new(runtime.handle().clone()),
    )?;

    println!("=== Counter ({path}) ===");
    println!("start value: {}", counter.value());

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        if input == "q" {
            break;
        }

        let result = match counter.handle_key(input)? {
            Some(value) => Some(value),
            None => counter.handle_control(input)?,
        };
        match result {
            Some(value) => println!("{value} ({})", counter.indicator()),
            None => println!("unbound input: {input:?}"),
        }
    }

    println!("final value: {}", counter.value());
    Ok(())
}
