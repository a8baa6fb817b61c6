use super::{IdGen, Scheduler, Task, TaskId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

struct ManualInner {
    now: Duration,
    // Keyed by (deadline, id) so iteration order is firing order.
    queue: BTreeMap<(Duration, TaskId), Task>,
}

/// Scheduler driven by a virtual clock.
///
/// Nothing runs until [`ManualScheduler::advance`] moves the clock past a
/// task's deadline. Useful for deterministic tests and for hosts that own
/// their own frame loop. Clones share the same clock and queue.
#[derive(Clone)]
pub struct ManualScheduler {
    ids: Arc<IdGen>,
    inner: Arc<Mutex<ManualInner>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            ids: Arc::new(IdGen::default()),
            inner: Arc::new(Mutex::new(ManualInner {
                now: Duration::ZERO,
                queue: BTreeMap::new(),
            })),
        }
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Advance the clock by `by` and run every task that became due, in
    /// deadline order. Returns how many tasks ran.
    ///
    /// Tasks run without the scheduler lock held, so they may schedule or
    /// cancel further work. A task scheduled during `advance` with a deadline
    /// inside the advanced window also runs in this call.
    pub fn advance(&self, by: Duration) -> usize {
        let target = {
            let mut inner = self.lock();
            inner.now += by;
            inner.now
        };

        let mut ran = 0;
        loop {
            let due = {
                let mut inner = self.lock();
                let first = inner.queue.keys().next().copied();
                match first {
                    Some(key) if key.0 <= target => inner.queue.remove(&key),
                    _ => None,
                }
            };
            match due {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.ids.next_id();
        let mut inner = self.lock();
        let deadline = inner.now + delay;
        inner.queue.insert((deadline, id), task);
        tracing::trace!(%id, ?deadline, "scheduled task");
        id
    }

    fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.lock();
        let key = inner.queue.keys().find(|(_, task_id)| *task_id == id).copied();
        match key {
            Some(key) => inner.queue.remove(&key).is_some(),
            None => false,
        }
    }

    fn is_pending(&self, id: TaskId) -> bool {
        self.lock().queue.keys().any(|(_, task_id)| *task_id == id)
    }
}
