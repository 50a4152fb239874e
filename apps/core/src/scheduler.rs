use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task some time after the call that scheduled it has returned.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask);
}

/// Sleeps on a short-lived thread, then runs the task there. With a zero delay
/// the task may start before `schedule` returns; use `DeferredQueue` when the
/// task must never overlap the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        let spawned = std::thread::Builder::new()
            .name("quickglyph-deferred".into())
            .spawn(move || {
                std::thread::sleep(delay);
                task();
            });
        if let Err(error) = spawned {
            log::error!("failed to spawn deferred task thread: {error}");
        }
    }
}

struct PendingTask {
    due: Instant,
    task: DeferredTask,
}

/// Queue drained by the owner's event loop. Clones share the same queue.
#[derive(Clone, Default)]
pub struct DeferredQueue {
    pending: Arc<Mutex<Vec<PendingTask>>>,
}

impl std::fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.lock().iter().map(|pending| pending.due).min()
    }

    /// Runs every task due at or before `now`, earliest first. Returns how many ran.
    pub fn run_due(&self, now: Instant) -> usize {
        let mut ready = {
            let mut pending = self.lock();
            let (ready, waiting): (Vec<PendingTask>, Vec<PendingTask>) =
                pending.drain(..).partition(|task| task.due <= now);
            *pending = waiting;
            ready
        };
        ready.sort_by_key(|task| task.due);

        let count = ready.len();
        for pending in ready {
            (pending.task)();
        }
        count
    }

    /// Runs everything regardless of due time.
    pub fn run_all(&self) -> usize {
        let mut ready: Vec<PendingTask> = self.lock().drain(..).collect();
        ready.sort_by_key(|task| task.due);

        let count = ready.len();
        for pending in ready {
            (pending.task)();
        }
        count
    }

    /// Sleeps until each task is due and runs it, until the queue is empty.
    pub fn drain_blocking(&self) -> usize {
        let mut count = 0;
        while let Some(due) = self.next_due() {
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
            count += self.run_due(Instant::now());
        }
        count
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingTask>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Scheduler for DeferredQueue {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        self.lock().push(PendingTask {
            due: Instant::now() + delay,
            task,
        });
    }
}
