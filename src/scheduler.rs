use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    future::Future,
    rc::{Rc, Weak},
    time::{Duration, Instant},
};

use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};
use slabmap::SlabMap;

use crate::timer::sleep_until;

pub use futures::channel::oneshot::Canceled;


/// Runs deferred callbacks on the current thread.
///
/// Time is virtual: it only moves forward through [`advance`](Self::advance),
/// [`advance_to`](Self::advance_to), [`run_until_idle`](Self::run_until_idle)
/// or [`run_realtime`](Self::run_realtime).
/// Callbacks run in order of due time, then in scheduling order.
#[derive(Clone, Default)]
pub struct Scheduler(Rc<RefCell<TaskQueue>>);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    due: Duration,
    seq: u64,
}

struct Entry {
    key: Key,
    f: Box<dyn FnOnce()>,
    done: oneshot::Sender<()>,
}

#[derive(Default)]
struct TaskQueue {
    now: Duration,
    next_seq: u64,
    tasks: BTreeMap<Key, usize>,
    entries: SlabMap<Entry>,
}

impl TaskQueue {
    fn insert(&mut self, delay: Duration, f: Box<dyn FnOnce()>) -> (usize, Key, oneshot::Receiver<()>) {
        let key = Key {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let (done, rx) = oneshot::channel();
        let id = self.entries.insert(Entry { key, f, done });
        self.tasks.insert(key, id);
        (id, key, rx)
    }
    fn is_live(&self, id: usize, key: Key) -> bool {
        self.entries.get(id).is_some_and(|e| e.key == key)
    }
    fn remove(&mut self, id: usize, key: Key) -> bool {
        if !self.is_live(id, key) {
            return false;
        }
        self.tasks.remove(&key);
        self.entries.remove(id);
        true
    }
    fn pop_due(&mut self, until: Duration) -> Option<Entry> {
        let (&key, &id) = self.tasks.first_key_value()?;
        if key.due > until {
            return None;
        }
        self.tasks.remove(&key);
        let entry = self.entries.remove(id)?;
        self.now = self.now.max(key.due);
        Some(entry)
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.0.borrow().now
    }

    /// Number of tasks that have neither fired nor been canceled.
    pub fn pending(&self) -> usize {
        self.0.borrow().entries.len()
    }

    /// Due time of the next task.
    pub fn next_due(&self) -> Option<Duration> {
        self.0.borrow().tasks.first_key_value().map(|(key, _)| key.due)
    }

    /// Schedules `f` to run once `delay` has elapsed.
    ///
    /// Dropping the returned task does not cancel it.
    pub fn schedule(&self, delay: Duration, f: impl FnOnce() + 'static) -> ScheduledTask {
        let (id, key, rx) = self.0.borrow_mut().insert(delay, Box::new(f));
        tracing::debug!(id, ?delay, due = ?key.due, "task scheduled");
        ScheduledTask {
            queue: Rc::downgrade(&self.0),
            id,
            key,
            completion: rx.shared(),
        }
    }

    /// Moves time forward by `duration`, running every task that becomes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, duration: Duration) -> usize {
        let until = self.now() + duration;
        self.advance_to(until)
    }

    /// Moves time forward to `until`, running every task due at or before it.
    ///
    /// Tasks scheduled by a running task are run too if they are due by `until`.
    pub fn advance_to(&self, until: Duration) -> usize {
        let mut count = 0;
        loop {
            let Some(entry) = self.0.borrow_mut().pop_due(until) else {
                break;
            };
            tracing::trace!(due = ?entry.key.due, "task fired");
            (entry.f)();
            let _ = entry.done.send(());
            count += 1;
        }
        let mut queue = self.0.borrow_mut();
        queue.now = queue.now.max(until);
        count
    }

    /// Runs tasks until none are left, moving time forward as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut count = 0;
        while let Some(due) = self.next_due() {
            count += self.advance_to(due);
        }
        count
    }

    /// Runs tasks as their due times pass in real time, until none are left.
    pub async fn run_realtime(&self) {
        let start = Instant::now();
        let base = self.now();
        while let Some(due) = self.next_due() {
            sleep_until(start + due.saturating_sub(base)).await;
            self.advance_to(due);
        }
    }
}
impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// A callback registered with [`Scheduler::schedule`].
pub struct ScheduledTask {
    queue: Weak<RefCell<TaskQueue>>,
    id: usize,
    key: Key,
    completion: Shared<oneshot::Receiver<()>>,
}

impl ScheduledTask {
    /// Cancels the task.
    ///
    /// Returns `false` if the task has already run or been canceled.
    pub fn cancel(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let canceled = queue.borrow_mut().remove(self.id, self.key);
        if canceled {
            tracing::debug!(id = self.id, "task canceled");
        }
        canceled
    }

    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|queue| queue.borrow().is_live(self.id, self.key))
    }

    pub fn due(&self) -> Duration {
        self.key.due
    }

    /// Completes with `Ok` when the task has run, or with `Err(Canceled)` when it is canceled
    /// or its scheduler is dropped.
    pub fn completion(&self) -> impl Future<Output = Result<(), Canceled>> + 'static {
        self.completion.clone()
    }
}
impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("due", &self.key.due)
            .field("pending", &self.is_pending())
            .finish()
    }
}
