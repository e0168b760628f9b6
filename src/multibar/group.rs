//! Named clusters of trackers.

use crate::tracker::Tracker;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// Trackers displayed under one heading.
///
/// A `Group` returned by the coordinator is a snapshot of the tracker list
/// taken at lookup time; the trackers themselves and the done counter are
/// live.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    trackers: Vec<Tracker>,
    done: Arc<AtomicUsize>,
    pinned: Arc<AtomicBool>,
}

impl Group {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trackers: Vec::new(),
            done: Arc::new(AtomicUsize::new(0)),
            pinned: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The heading painted above the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of trackers at lookup time.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether the group has no trackers.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// The trackers in display order.
    pub fn trackers(&self) -> &[Tracker] {
        &self.trackers
    }

    /// Number of trackers counted as done.
    pub fn done_count(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    /// Whether every tracker of the group is done.
    pub fn all_done(&self) -> bool {
        self.done_count() >= self.trackers.len()
    }

    /// The tracker at `index`.
    pub fn task_by_index(&self, index: usize) -> Option<&Tracker> {
        self.trackers.get(index)
    }

    /// The tracker titled `title`.
    pub fn task_by_name(&self, title: &str) -> Option<&Tracker> {
        self.trackers.iter().find(|t| t.title() == title)
    }

    pub(crate) fn done_counter(&self) -> Arc<AtomicUsize> {
        self.done.clone()
    }

    pub(crate) fn push(&mut self, tracker: Tracker) -> usize {
        self.trackers.push(tracker);
        self.pinned.store(false, Ordering::Release);
        self.trackers.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Tracker> {
        if index >= self.trackers.len() {
            return None;
        }
        let tracker = self.trackers.remove(index);
        if tracker.is_settled() {
            self.done.fetch_sub(1, Ordering::AcqRel);
        }
        Some(tracker)
    }

    /// Completed groups are painted once more, then stay above the live
    /// region and are skipped by later paints.
    pub(crate) fn is_pinned(&self) -> bool {
        self.pinned.load(Ordering::Acquire)
    }

    pub(crate) fn pin(&self) {
        self.pinned.store(true, Ordering::Release);
    }
}
