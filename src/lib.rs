//! # Tally
//!
//! The core of a persisted counter widget.
//!
//! A [`CounterStore`] holds one integer, increments, decrements or resets it
//! in response to commands, key presses or button activations, and on every
//! change:
//! - writes the value to a [`KeyValueStorage`] under `counterValue`
//! - renders the text and a sign-dependent [`Indicator`] into a [`DisplaySink`]
//! - turns on a short pulse and schedules its clear on a [`Scheduler`]
//!
//! The host surfaces are traits, so the same core runs behind a browser
//! binding, a terminal front end, or a test harness:
//! - storage: [`MemoryStorage`], [`FileStorage`]
//! - display: [`RecordingDisplay`], [`LogDisplay`]
//! - scheduling: [`ManualScheduler`] (virtual clock), [`TokioScheduler`]

pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod runtime;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::{CounterConfig, PulsePolicy};
pub use display::{DisplaySink, Indicator, LogDisplay, RecordingDisplay};
pub use error::{CounterError, Result};
pub use input::{Command, Keymap};
pub use runtime::{ManualScheduler, Scheduler, TaskId, TokioScheduler};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CounterStore, Store, SubscriptionId};
