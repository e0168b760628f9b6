//! The coordinator: a registry of trackers and its redraw loop.
//!
//! A [`MultiBar`] owns every tracker shown on one terminal. Trackers ask it
//! for a redraw whenever they change; the requests coalesce into a single
//! pending flag consumed by one dedicated redraw thread, which is the only
//! writer of the output. Painting reads the live state of every tracker, so
//! dropping intermediate requests loses nothing.
//!
//! Trackers are kept either in one flat list or in named [`Group`]s. The
//! layout is chosen by the [`MultiBarBuilder`] and cannot change.
//!
//! # Examples
//!
//! ```rust,no_run
//! use multibar::{MultiBar, TrackerBuilder};
//!
//! # fn main() -> multibar::Result<()> {
//! let bars = MultiBar::new();
//! let tracker = bars.add(TrackerBuilder::new().title("upload").upper_bound(100))?;
//! tracker.step(100);
//! assert_eq!(bars.percent(0).as_deref(), Some("100.0%"));
//! bars.close();
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
mod group;
mod paint;
pub mod signal;

pub use builder::MultiBarBuilder;
pub use config::{MultiBarConfig, OnDone};
pub use group::Group;
pub use signal::{ExitSignal, RedrawSignal};

use crate::task::{self, OnExit};
use crate::term::{MarkupTranslator, Translator};
use crate::tracker::{Link, Tracker, TrackerBuilder};
use crate::{Error, Result};
use paint::PaintState;

use parking_lot::{Mutex, RwLock};
use std::{
    fmt,
    io::{self, Write},
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Weak,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, warn};

/// Pause before re-requesting a paint that found the tracker list locked.
const BUSY_RETRY: Duration = Duration::from_millis(1);

enum Rows {
    Flat(Vec<Tracker>),
    Grouped(Vec<Group>),
}

impl Rows {
    fn tracker_count(&self) -> usize {
        match self {
            Rows::Flat(trackers) => trackers.len(),
            Rows::Grouped(groups) => groups.iter().map(Group::len).sum(),
        }
    }

    fn nth(&self, index: usize) -> Option<&Tracker> {
        match self {
            Rows::Flat(trackers) => trackers.get(index),
            Rows::Grouped(groups) => groups.iter().flat_map(Group::trackers).nth(index),
        }
    }

    fn clear(&mut self) {
        match self {
            Rows::Flat(trackers) => trackers.clear(),
            Rows::Grouped(groups) => groups.clear(),
        }
    }
}

struct Shared {
    rows: RwLock<Rows>,
    paint: Mutex<PaintState>,
    signal: Arc<RedrawSignal>,
    exit: ExitSignal,
    closed: AtomicBool,
    on_done: Mutex<Option<OnDone>>,
    translator: MarkupTranslator,
    hide_cursor: bool,
    indent: Option<String>,
    cursor_hidden: AtomicBool,
    drawer: Mutex<Option<JoinHandle<()>>>,
    paints: AtomicUsize,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.exit.fire();
        self.signal.close();
        if self.cursor_hidden.load(Ordering::Acquire) {
            let _ = self.paint.get_mut().term.show_cursor();
        }
    }
}

/// Multi-bar coordinator.
///
/// `MultiBar` is a cheap cloneable handle. The redraw thread holds only a
/// weak reference, so the coordinator is torn down once the last handle is
/// dropped, even without an explicit [`close`](MultiBar::close).
#[derive(Clone)]
pub struct MultiBar {
    shared: Arc<Shared>,
}

impl fmt::Debug for MultiBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiBar")
            .field("grouped", &self.is_grouped())
            .field("trackers", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for MultiBar {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiBar {
    /// Creates a flat coordinator painting to standard output.
    pub fn new() -> Self {
        MultiBarBuilder::new().build()
    }

    /// Creates a builder.
    pub fn builder() -> MultiBarBuilder {
        MultiBarBuilder::new()
    }

    pub(crate) fn with_config(config: MultiBarConfig) -> Self {
        let term = config
            .output
            .unwrap_or_else(|| Box::new(console::Term::stdout()));
        let colored = config.colored.unwrap_or_else(console::colors_enabled);
        let rows = if config.grouped {
            Rows::Grouped(Vec::new())
        } else {
            Rows::Flat(Vec::new())
        };

        let shared = Arc::new(Shared {
            rows: RwLock::new(rows),
            paint: Mutex::new(PaintState::new(term)),
            signal: Arc::new(RedrawSignal::new()),
            exit: ExitSignal::new(),
            closed: AtomicBool::new(false),
            on_done: Mutex::new(config.on_done),
            translator: MarkupTranslator::new(colored),
            hide_cursor: config.hide_cursor,
            indent: config.indent,
            cursor_hidden: AtomicBool::new(false),
            drawer: Mutex::new(None),
            paints: AtomicUsize::new(0),
        });

        let signal = shared.signal.clone();
        let weak = Arc::downgrade(&shared);
        match thread::Builder::new()
            .name("multibar-redraw".into())
            .spawn(move || redraw_loop(signal, weak))
        {
            Ok(handle) => *shared.drawer.lock() = Some(handle),
            Err(e) => warn!(error = %e, "failed to spawn the redraw thread"),
        }

        MultiBar { shared }
    }

    /// Adds a tracker to the flat list and starts its task, if any.
    pub fn add(&self, builder: TrackerBuilder) -> Result<Tracker> {
        self.insert(None, builder, None)
    }

    /// Adds a tracker to the named group, creating the group on first use.
    ///
    /// Titles are unique within a group.
    pub fn add_to_group(&self, group: &str, builder: TrackerBuilder) -> Result<Tracker> {
        self.insert(Some(group), builder, None)
    }

    pub(crate) fn insert(
        &self,
        group: Option<&str>,
        builder: TrackerBuilder,
        on_exit: Option<OnExit>,
    ) -> Result<Tracker> {
        self.ensure_open()?;
        let builder = match &self.shared.indent {
            Some(indent) => builder.default_indent(indent),
            None => builder,
        };
        let (tracker, hooks) = builder.build()?;
        let group_done = {
            let mut rows = self.shared.rows.write();
            match (&mut *rows, group) {
                (Rows::Flat(trackers), None) => {
                    trackers.push(tracker.clone());
                    debug!(index = trackers.len() - 1, title = tracker.title(), "tracker added");
                    None
                }
                (Rows::Grouped(groups), Some(name)) => {
                    let position = match groups.iter().position(|g| g.name() == name) {
                        Some(position) => position,
                        None => {
                            groups.push(Group::new(name));
                            groups.len() - 1
                        }
                    };
                    let target = &mut groups[position];
                    if target.task_by_name(tracker.title()).is_some() {
                        return Err(Error::AlreadyExists(format!(
                            "{:?} in group {name:?}",
                            tracker.title()
                        )));
                    }
                    target.push(tracker.clone());
                    debug!(group = name, title = tracker.title(), "tracker added to group");
                    Some(target.done_counter())
                }
                (Rows::Flat(_), Some(_)) => {
                    return Err(Error::Layout("flat coordinators only accept add".into()))
                }
                (Rows::Grouped(_), None) => {
                    return Err(Error::Layout(
                        "grouped coordinators only accept add_to_group".into(),
                    ))
                }
            }
        };

        tracker.attach(Link {
            redraw: Some(self.shared.signal.clone()),
            group_done,
        });
        // Without hooks no thread runs; completion alone releases a waiter.
        if !hooks.is_empty() {
            task::spawn(tracker.clone(), hooks, self.exit_signal(), on_exit);
        }
        self.redraw();
        Ok(tracker)
    }

    /// Removes the tracker at `index` from the flat list.
    pub fn remove(&self, index: usize) -> Result<Tracker> {
        let removed = {
            let mut rows = self.shared.rows.write();
            let Rows::Flat(trackers) = &mut *rows else {
                return Err(Error::Layout(
                    "grouped coordinators only accept remove_from_group".into(),
                ));
            };
            if index >= trackers.len() {
                return Err(Error::NotFound(format!("tracker {index}")));
            }
            let removed = trackers.remove(index);
            self.shared.paint.lock().row_removed(index);
            removed
        };
        debug!(index, title = removed.title(), "tracker removed");
        self.redraw();
        Ok(removed)
    }

    /// Removes the tracker at `index` from the named group.
    pub fn remove_from_group(&self, group: &str, index: usize) -> Result<Tracker> {
        let removed = {
            let mut rows = self.shared.rows.write();
            let Rows::Grouped(groups) = &mut *rows else {
                return Err(Error::Layout("flat coordinators only accept remove".into()));
            };
            let target = groups
                .iter_mut()
                .find(|g| g.name() == group)
                .ok_or_else(|| Error::NotFound(format!("group {group:?}")))?;
            target
                .remove(index)
                .ok_or_else(|| Error::NotFound(format!("tracker {index} in group {group:?}")))?
        };
        debug!(group, index, title = removed.title(), "tracker removed from group");
        self.redraw();
        Ok(removed)
    }

    /// Requests a repaint. Never blocks; a no-op once closed.
    pub fn redraw(&self) {
        if !self.is_closed() {
            self.shared.signal.request();
        }
    }

    /// The cancellation signal shared by every worker of this coordinator.
    pub fn exit_signal(&self) -> ExitSignal {
        self.shared.exit.clone()
    }

    /// Asks every worker to stop without closing the coordinator.
    pub fn signal_exit(&self) {
        self.shared.exit.fire();
    }

    /// Drives the jobs bound with [`TrackerBuilder::job`] on the calling thread.
    ///
    /// Every pass polls each pending job once, in display order. Grouped
    /// coordinators work through their groups one at a time: the first
    /// group with a pending job gets the pass. Returns when no job is left,
    /// or when `exit` fires or the coordinator closes.
    pub fn run(&self, exit: &ExitSignal) {
        debug!("job loop started");
        while !exit.is_set() && !self.is_closed() {
            let Some(batch) = self.pending_jobs() else {
                break;
            };
            for tracker in &batch {
                if exit.is_set() {
                    break;
                }
                tracker.run_job();
            }
            self.redraw();
        }
        debug!("job loop stopped");
    }

    /// Trackers of the next pass of [`run`](Self::run).
    fn pending_jobs(&self) -> Option<Vec<Tracker>> {
        let rows = self.shared.rows.read();
        let pending = |trackers: &[Tracker]| -> Vec<Tracker> {
            trackers
                .iter()
                .filter(|t| t.has_pending_job())
                .cloned()
                .collect()
        };
        match &*rows {
            Rows::Flat(trackers) => Some(pending(trackers)).filter(|b| !b.is_empty()),
            Rows::Grouped(groups) => groups
                .iter()
                .map(|g| pending(g.trackers()))
                .find(|b| !b.is_empty()),
        }
    }

    /// The tracker at `index`, counting through the groups in display order.
    pub fn tracker(&self, index: usize) -> Option<Tracker> {
        self.shared.rows.read().nth(index).cloned()
    }

    /// Every tracker in display order.
    pub fn trackers(&self) -> Vec<Tracker> {
        match &*self.shared.rows.read() {
            Rows::Flat(trackers) => trackers.clone(),
            Rows::Grouped(groups) => groups.iter().flat_map(Group::trackers).cloned().collect(),
        }
    }

    /// Progress of the tracker at `index` as a string, e.g. `"75.5%"`.
    pub fn percent(&self, index: usize) -> Option<String> {
        self.tracker(index).map(|t| t.percent())
    }

    /// Progress of the tracker at `index` as a fraction in `[0, 1]`.
    pub fn percent_f(&self, index: usize) -> Option<f64> {
        self.tracker(index).map(|t| t.percent_f())
    }

    /// Progress of the tracker at `index` rounded to an integer percent.
    pub fn percent_i(&self, index: usize) -> Option<i64> {
        self.tracker(index).map(|t| t.percent_i())
    }

    /// `(lower, upper, position)` of the tracker at `index`.
    pub fn bounds(&self, index: usize) -> Option<(i64, i64, i64)> {
        self.tracker(index).map(|t| t.bounds())
    }

    /// Snapshot of the group at `index`. `None` on a flat coordinator.
    pub fn group_by_index(&self, index: usize) -> Option<Group> {
        match &*self.shared.rows.read() {
            Rows::Grouped(groups) => groups.get(index).cloned(),
            Rows::Flat(_) => None,
        }
    }

    /// Snapshot of the group called `name`. `None` on a flat coordinator.
    pub fn group_by_name(&self, name: &str) -> Option<Group> {
        match &*self.shared.rows.read() {
            Rows::Grouped(groups) => groups.iter().find(|g| g.name() == name).cloned(),
            Rows::Flat(_) => None,
        }
    }

    /// Number of trackers.
    pub fn len(&self) -> usize {
        self.shared.rows.read().tracker_count()
    }

    /// Whether no tracker was added, or all were removed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether trackers live in named groups.
    pub fn is_grouped(&self) -> bool {
        matches!(&*self.shared.rows.read(), Rows::Grouped(_))
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Whether every tracker is done. `false` for an empty coordinator.
    pub fn all_done(&self) -> bool {
        let trackers = self.trackers();
        !trackers.is_empty() && trackers.iter().all(Tracker::is_done)
    }

    /// Number of paints performed so far.
    pub fn paint_count(&self) -> usize {
        self.shared.paints.load(Ordering::Acquire)
    }

    /// Lines of the live region, i.e. how far the next paint rewinds.
    pub fn live_lines(&self) -> usize {
        self.shared.paint.lock().live_lines()
    }

    /// Closes the coordinator. Idempotent and never fails.
    ///
    /// Fires the exit signal, stops the redraw thread, paints the final
    /// state once, restores the cursor and releases the trackers. Later
    /// redraws and writes are no-ops.
    pub fn close(&self) {
        let shared = &self.shared;
        if shared
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        debug!("closing coordinator");
        shared.exit.fire();
        shared.signal.close();

        let drawer = shared.drawer.lock().take();
        if let Some(handle) = drawer {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                warn!("redraw thread panicked");
            }
        }

        {
            let rows = shared.rows.read();
            let mut paint = shared.paint.lock();
            match panic::catch_unwind(AssertUnwindSafe(|| self.paint_rows(&mut paint, &rows))) {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "failed to paint the final state"),
                Err(_) => warn!("final paint panicked"),
            }
            if shared.cursor_hidden.swap(false, Ordering::AcqRel) {
                if let Err(e) = paint.term.show_cursor() {
                    warn!(error = %e, "failed to restore the cursor");
                }
            }
        }
        shared.rows.write().clear();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    fn paint_rows(&self, paint: &mut PaintState, rows: &Rows) -> io::Result<bool> {
        let shared = &self.shared;
        if shared.hide_cursor && !shared.cursor_hidden.swap(true, Ordering::AcqRel) {
            paint.term.hide_cursor()?;
        }
        let translator: &dyn Translator = &shared.translator;
        let done = match rows {
            Rows::Flat(trackers) => paint.paint_flat(trackers, translator)?,
            Rows::Grouped(groups) => paint.paint_grouped(groups, translator)?,
        };
        shared.paints.fetch_add(1, Ordering::AcqRel);
        Ok(done && rows.tracker_count() > 0)
    }

    /// One cycle of the redraw loop.
    fn redraw_now(&self) {
        let shared = &self.shared;
        if self.is_closed() {
            return;
        }
        let Some(rows) = shared.rows.try_read() else {
            // A writer holds the list; the next request repaints it.
            thread::sleep(BUSY_RETRY);
            shared.signal.request();
            return;
        };
        let result = {
            let mut paint = shared.paint.lock();
            self.paint_rows(&mut paint, &rows)
        };
        drop(rows);

        match result {
            Ok(true) => {
                let callback = shared.on_done.lock().take();
                if let Some(callback) = callback {
                    debug!("all trackers done");
                    callback(self);
                    self.redraw();
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to paint progress"),
        }
    }
}

fn redraw_loop(signal: Arc<RedrawSignal>, shared: Weak<Shared>) {
    while signal.wait() {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let bars = MultiBar { shared };
        // A panicking hook must not take the only writer down with it.
        if panic::catch_unwind(AssertUnwindSafe(|| bars.redraw_now())).is_err() {
            warn!("redraw cycle panicked");
        }
    }
    debug!("redraw loop stopped");
}

impl Write for MultiBar {
    /// Writes raw text to the output, between paints. Discarded once closed.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Ok(buf.len());
        }
        self.shared.paint.lock().write_through(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.shared.paint.lock().term.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::AnsiTerminal;

    fn quiet() -> MultiBar {
        MultiBarBuilder::new()
            .output(AnsiTerminal::new(io::sink()))
            .colored(false)
            .build()
    }

    #[test]
    fn test_layouts_are_exclusive() {
        let flat = quiet();
        assert!(matches!(
            flat.add_to_group("g", TrackerBuilder::new()),
            Err(Error::Layout(_))
        ));
        let grouped = MultiBarBuilder::new()
            .output(AnsiTerminal::new(io::sink()))
            .grouped(true)
            .build();
        assert!(matches!(grouped.add(TrackerBuilder::new()), Err(Error::Layout(_))));
        flat.close();
        grouped.close();
    }

    #[test]
    fn test_remove_bounds() {
        let bars = quiet();
        bars.add(TrackerBuilder::new().title("a")).unwrap();
        bars.add(TrackerBuilder::new().title("b")).unwrap();
        assert_eq!(bars.remove(0).unwrap().title(), "a");
        assert!(matches!(bars.remove(1), Err(Error::NotFound(_))));
        assert_eq!(bars.len(), 1);
        bars.close();
    }

    #[test]
    fn test_duplicate_title_in_group() {
        let bars = MultiBarBuilder::new()
            .output(AnsiTerminal::new(io::sink()))
            .grouped(true)
            .build();
        bars.add_to_group("g", TrackerBuilder::new().title("a")).unwrap();
        assert!(matches!(
            bars.add_to_group("g", TrackerBuilder::new().title("a")),
            Err(Error::AlreadyExists(_))
        ));
        bars.add_to_group("h", TrackerBuilder::new().title("a")).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(matches!(
            bars.remove_from_group("nope", 0),
            Err(Error::NotFound(_))
        ));
        bars.close();
    }

    #[test]
    fn test_default_indent() {
        let bars = MultiBarBuilder::new()
            .output(AnsiTerminal::new(io::sink()))
            .indent(">>")
            .build();
        let a = bars
            .add(TrackerBuilder::new().title("a").schema("{Indent}{Title}"))
            .unwrap();
        let b = bars
            .add(TrackerBuilder::new().title("b").schema("{Indent}{Title}").indent("-"))
            .unwrap();
        assert_eq!(a.line(), ">>a");
        assert_eq!(b.line(), "-b");
        bars.close();
    }

    #[test]
    fn test_add_after_close() {
        let bars = quiet();
        bars.close();
        bars.close();
        assert!(matches!(bars.add(TrackerBuilder::new()), Err(Error::Closed)));
        assert!(bars.is_empty());
    }
}
