//! Runtime support for deferred work.
//!
//! The only deferred work a counter does is clearing the display pulse. It is
//! modelled as a scheduled task with an explicit [`TaskId`], so callers can
//! cancel or replace it instead of relying on idempotent clears.

mod manual;
mod spawned;

pub use manual::ManualScheduler;
pub use spawned::TokioScheduler;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Identifier of a scheduled task, unique within its scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay without blocking the caller.
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancel a pending task. Returns `false` if it already ran, was already
    /// cancelled, or was never scheduled here.
    fn cancel(&self, id: TaskId) -> bool;

    /// Whether `id` is still waiting to run.
    fn is_pending(&self, id: TaskId) -> bool;
}

/// Monotonic id source shared by the scheduler implementations.
#[derive(Debug, Default)]
struct IdGen {
    next: AtomicU64,
}

impl IdGen {
    fn next_id(&self) -> TaskId {
        TaskId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
