//! Signals shared between trackers, workers and the redraw loop.
//!
//! [`RedrawSignal`] is a coalescing "something changed" flag: any number of
//! requests made while the drawer is busy collapse into one pending cycle,
//! and requesting never blocks. [`ExitSignal`] is a one-way broadcast flag
//! that workers poll between blocking steps.

use parking_lot::{Condvar, Mutex};
use std::{sync::Arc, time::Duration};

#[derive(Debug, Default)]
struct RedrawState {
    pending: bool,
    closed: bool,
}

/// Coalescing redraw request flag.
#[derive(Debug, Default)]
pub struct RedrawSignal {
    state: Mutex<RedrawState>,
    cond: Condvar,
}

impl RedrawSignal {
    /// Creates an idle signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a redraw as pending.
    ///
    /// Returns `false` once the signal is closed; the request is dropped.
    pub fn request(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        let wake = !state.pending;
        state.pending = true;
        drop(state);
        if wake {
            self.cond.notify_one();
        }
        true
    }

    /// Blocks until a redraw is pending and consumes it.
    ///
    /// Returns `false` when the signal was closed.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while !state.pending && !state.closed {
            self.cond.wait(&mut state);
        }
        if state.closed {
            return false;
        }
        state.pending = false;
        true
    }

    /// Whether a request is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    /// Closes the signal and wakes the waiter. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.pending = false;
        drop(state);
        self.cond.notify_all();
    }

    /// Whether the signal was closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[derive(Debug, Default)]
struct ExitInner {
    fired: Mutex<bool>,
    cond: Condvar,
}

/// Cooperative cancellation flag broadcast to every worker of a coordinator.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
    inner: Arc<ExitInner>,
}

impl ExitSignal {
    /// Creates a signal that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking check.
    pub fn is_set(&self) -> bool {
        *self.inner.fired.lock()
    }

    /// Fires the signal and wakes all waiters. Idempotent.
    pub fn fire(&self) {
        let mut fired = self.inner.fired.lock();
        *fired = true;
        drop(fired);
        self.inner.cond.notify_all();
    }

    /// Sleeps for up to `timeout`, waking early when the signal fires.
    ///
    /// Returns `true` if the signal is set. Workers use this as an
    /// interruptible tick.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut fired = self.inner.fired.lock();
        if !*fired {
            let _ = self.inner.cond.wait_for(&mut fired, timeout);
        }
        *fired
    }
}
