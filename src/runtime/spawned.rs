use super::{IdGen, Scheduler, Task, TaskId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type ActiveTasks = Arc<Mutex<HashMap<TaskId, JoinHandle<()>>>>;

/// Scheduler that spawns each task onto a tokio runtime.
///
/// Each task sleeps for its delay and then runs; cancellation aborts the
/// spawned future. A task leaves the active table as soon as its delay
/// elapses, so it can no longer be cancelled once it has started.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
    ids: Arc<IdGen>,
    active: ActiveTasks,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            ids: Arc::new(IdGen::default()),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Bind to the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of tasks still waiting for their delay to elapse.
    pub fn pending(&self) -> usize {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.ids.next_id();
        let active = Arc::clone(&self.active);

        // Hold the table lock across spawn so the task cannot try to remove
        // its own entry before it is inserted.
        let mut table = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // Leave the table first so a panicking task cannot stay pending.
            active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            task();
        });
        table.insert(id, join);
        tracing::trace!(%id, ?delay, "spawned task");
        id
    }

    fn cancel(&self, id: TaskId) -> bool {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(join) => {
                join.abort();
                tracing::trace!(%id, "aborted task");
                true
            }
            None => false,
        }
    }

    fn is_pending(&self, id: TaskId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }
}
