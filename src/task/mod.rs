//! Background tasks bound to trackers.
//!
//! Every tracker built with a worker gets its own OS thread once it joins a
//! coordinator. The thread runs the start hook, then the worker, which polls
//! the coordinator's [`ExitSignal`] between blocking steps. There is no
//! forced termination: closing the coordinator only fires the signal.
//!
//! [`Tasks`] adds a [`WaitGroup`] on top so the caller can block until all
//! tasks finished.
//!
//! # Examples
//!
//! ```rust,no_run
//! use multibar::{MultiBar, TaskBuilder, Tasks};
//! use std::time::Duration;
//!
//! # fn main() -> multibar::Result<()> {
//! let tasks = Tasks::new(MultiBar::new());
//! for i in 0..3 {
//!     tasks.add(
//!         TaskBuilder::new(format!("Task {i}"))
//!             .bar(|bar| bar.stepper(i).width(32))
//!             .worker(|tracker, exit| {
//!                 while !tracker.is_completed() {
//!                     if exit.wait_timeout(Duration::from_millis(30)) {
//!                         break;
//!                     }
//!                     tracker.step(1);
//!                 }
//!                 false
//!             }),
//!     )?;
//! }
//! tasks.wait();
//! tasks.close();
//! # Ok(())
//! # }
//! ```

use crate::multibar::{ExitSignal, MultiBar};
use crate::tracker::{TaskHooks, Tracker, TrackerBuilder};
use crate::Result;

use parking_lot::{Condvar, Mutex};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, error};

/// Callback run when a task thread ends, however it ends.
pub(crate) type OnExit = Box<dyn FnOnce() + Send>;

struct ExitGuard(Option<OnExit>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if let Some(on_exit) = self.0.take() {
            on_exit();
        }
    }
}

/// Runs the task hooks of `tracker` on a new thread.
pub(crate) fn spawn(tracker: Tracker, hooks: TaskHooks, exit: ExitSignal, on_exit: Option<OnExit>) {
    let guard = ExitGuard(on_exit);
    let worker_tracker = tracker.clone();
    let spawned = thread::Builder::new()
        .name(format!("multibar-task-{}", tracker.title()))
        .spawn(move || {
            let _guard = guard;
            run(worker_tracker, hooks, exit);
        });
    if let Err(e) = spawned {
        error!(title = tracker.title(), error = %e, "failed to spawn task thread");
        tracker.mark_stalled();
    }
}

fn run(tracker: Tracker, hooks: TaskHooks, exit: ExitSignal) {
    tracker.mark_started();
    if let Some(on_start) = hooks.on_start {
        on_start(&tracker, &exit);
    }
    let Some(worker) = hooks.worker else {
        return;
    };
    if worker(&tracker, &exit) {
        debug!(title = tracker.title(), "worker retired its tracker");
        tracker.retire();
    } else if !tracker.is_completed() {
        debug!(title = tracker.title(), "worker returned before completion");
        tracker.mark_stalled();
    }
}

#[derive(Default)]
struct WaitState {
    count: Mutex<usize>,
    cond: Condvar,
}

/// Counts outstanding tasks and lets callers block until none remain.
#[derive(Clone, Default)]
pub struct WaitGroup {
    inner: Arc<WaitState>,
}

impl WaitGroup {
    /// Creates an empty wait group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` outstanding tasks.
    pub fn add(&self, n: usize) {
        *self.inner.count.lock() += n;
    }

    /// Marks one task finished. Extra calls past zero are ignored.
    pub fn done(&self) {
        let mut count = self.inner.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.cond.notify_all();
        }
    }

    /// Number of outstanding tasks.
    pub fn count(&self) -> usize {
        *self.inner.count.lock()
    }

    /// Blocks until the count drops to zero.
    pub fn wait(&self) {
        let mut count = self.inner.count.lock();
        while *count > 0 {
            self.inner.cond.wait(&mut count);
        }
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`. Returns `true`
    /// when the count reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.inner.count.lock();
        while *count > 0 {
            if self.inner.cond.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}

/// Releases one slot of a wait group, once.
struct Release {
    wg: WaitGroup,
    released: AtomicBool,
}

impl Release {
    fn new(wg: WaitGroup) -> Arc<Self> {
        wg.add(1);
        Arc::new(Self {
            wg,
            released: AtomicBool::new(false),
        })
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.wg.done();
        }
    }
}

/// A tracker plus its task hooks, with task defaults: a `[0, 100]` range.
pub struct TaskBuilder {
    bar: TrackerBuilder,
}

impl TaskBuilder {
    /// Creates a task whose bar is titled `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            bar: TrackerBuilder::new().title(title),
        }
    }

    /// Adjusts the bar settings.
    pub fn bar(mut self, f: impl FnOnce(TrackerBuilder) -> TrackerBuilder) -> Self {
        self.bar = f(self.bar);
        self
    }

    /// Runs on the task thread before the worker.
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker, &ExitSignal) + Send + 'static,
    {
        self.bar = self.bar.on_start(f);
        self
    }

    /// Runs once when the tracker completes.
    pub fn on_completed<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker) + Send + 'static,
    {
        self.bar = self.bar.on_completed(f);
        self
    }

    /// Sets the long-running job, see [`TrackerBuilder::worker`].
    pub fn worker<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker, &ExitSignal) -> bool + Send + 'static,
    {
        self.bar = self.bar.worker(f);
        self
    }
}

impl From<TrackerBuilder> for TaskBuilder {
    fn from(bar: TrackerBuilder) -> Self {
        Self { bar }
    }
}

/// A coordinator plus a wait group over the tasks added to it.
pub struct Tasks {
    bars: MultiBar,
    wg: WaitGroup,
}

impl Tasks {
    /// Creates a runner adding its tasks to `bars`.
    pub fn new(bars: MultiBar) -> Self {
        Self {
            bars,
            wg: WaitGroup::new(),
        }
    }

    /// The coordinator painting the tasks.
    pub fn multibar(&self) -> &MultiBar {
        &self.bars
    }

    /// Adds a task to a flat coordinator and starts it.
    pub fn add(&self, task: impl Into<TaskBuilder>) -> Result<Tracker> {
        self.insert(None, task.into())
    }

    /// Adds a task to a group of a grouped coordinator and starts it.
    pub fn add_to_group(&self, group: &str, task: impl Into<TaskBuilder>) -> Result<Tracker> {
        self.insert(Some(group), task.into())
    }

    fn insert(&self, group: Option<&str>, task: TaskBuilder) -> Result<Tracker> {
        let release = Release::new(self.wg.clone());
        let on_completed = release.clone();
        let on_exit = release.clone();
        let bar = task.bar.wrap_on_completed(move |_| on_completed.release());
        let added = self
            .bars
            .insert(group, bar, Some(Box::new(move || on_exit.release())));
        if added.is_err() {
            release.release();
        }
        added
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.wg.count()
    }

    /// Blocks until every task completed or its worker returned.
    pub fn wait(&self) {
        self.wg.wait();
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wg.wait_timeout(timeout)
    }

    /// Closes the coordinator, which asks every worker to stop.
    pub fn close(&self) {
        self.bars.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_group() {
        let wg = WaitGroup::new();
        wg.add(2);
        let worker = {
            let wg = wg.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                wg.done();
                wg.done();
                wg.done();
            })
        };
        wg.wait();
        worker.join().unwrap();
        assert_eq!(wg.count(), 0);
    }

    #[test]
    fn test_wait_group_timeout() {
        let wg = WaitGroup::new();
        wg.add(1);
        assert!(!wg.wait_timeout(Duration::from_millis(10)));
        wg.done();
        assert!(wg.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_release_is_once() {
        let wg = WaitGroup::new();
        wg.add(1);
        let release = Release::new(wg.clone());
        release.release();
        release.release();
        assert_eq!(wg.count(), 1);
    }
}
