//! Progress trackers.
//!
//! A [`Tracker`] is the live state of one bar: its bounds, position, timing
//! and renderer. It is a cheap cloneable handle, so a worker thread can own a
//! clone while the coordinator keeps another for painting.
//!
//! The position lives in an atomic and is updated without locking. Bounds,
//! timing and the renderer sit behind `parking_lot` locks since they are
//! read together. Every mutation asks the owning coordinator for a redraw;
//! a tracker never writes to the terminal itself.
//!
//! Trackers are created through [`TrackerBuilder`] and added to a
//! [`MultiBar`](crate::MultiBar).

mod builder;

pub use builder::TrackerBuilder;
pub(crate) use builder::TaskHooks;

use crate::multibar::signal::{ExitSignal, RedrawSignal};
use crate::render::{BarConfig, BarState, BarStyle, Renderer, SchemaData};
use crate::utils::{fltfmt_percent, percent_int};
use crate::Result;

use parking_lot::{Mutex, RwLock};
use std::{
    fmt, io,
    sync::{
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::warn;

/// Long-running job bound to a tracker. Returns `true` to retire the tracker.
pub type Worker = Box<dyn FnOnce(&Tracker, &ExitSignal) -> bool + Send>;

/// Runs once on the task thread, before the worker.
pub type OnStart = Box<dyn FnOnce(&Tracker, &ExitSignal) + Send>;

/// Runs once, when the tracker first reaches its upper bound.
pub type OnCompleted = Box<dyn FnOnce(&Tracker) + Send>;

/// May edit the schema values before every render.
pub type OnDataPrepared = Box<dyn Fn(&Tracker, &mut SchemaData) + Send + Sync>;

/// One slice of work polled by [`MultiBar::run`](crate::MultiBar::run).
///
/// Receives the current position and returns how far to advance.
pub type Job = Box<dyn FnMut(&Tracker, i64) -> Result<i64> + Send>;

/// Handles a tracker receives when it joins a coordinator.
#[derive(Clone, Default)]
pub(crate) struct Link {
    pub(crate) redraw: Option<Arc<RedrawSignal>>,
    pub(crate) group_done: Option<Arc<AtomicUsize>>,
}

struct Timing {
    start: Instant,
    stop: Instant,
}

struct Inner {
    title: String,
    bounds: RwLock<(i64, i64)>,
    position: AtomicI64,
    seeded: AtomicI64,
    completed: AtomicBool,
    retired: AtomicBool,
    stalled: AtomicBool,
    settled: AtomicBool,
    timing: Mutex<Timing>,
    renderer: RwLock<Box<dyn Renderer>>,
    on_completed: Mutex<Option<OnCompleted>>,
    on_data_prepared: Option<OnDataPrepared>,
    job: Mutex<Option<Job>>,
    link: RwLock<Link>,
}

/// One progress bar or spinner.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<Inner>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lower, upper, position) = self.bounds();
        f.debug_struct("Tracker")
            .field("title", &self.inner.title)
            .field("lower", &lower)
            .field("upper", &upper)
            .field("position", &position)
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl Tracker {
    pub(crate) fn new(
        title: String,
        (lower, upper): (i64, i64),
        initial: i64,
        renderer: Box<dyn Renderer>,
        on_completed: Option<OnCompleted>,
        on_data_prepared: Option<OnDataPrepared>,
        job: Option<Job>,
    ) -> Self {
        let now = Instant::now();
        Self {
            inner: Arc::new(Inner {
                title,
                bounds: RwLock::new((lower, upper)),
                position: AtomicI64::new(initial.max(lower)),
                seeded: AtomicI64::new(initial.max(lower)),
                completed: AtomicBool::new(false),
                retired: AtomicBool::new(false),
                stalled: AtomicBool::new(false),
                settled: AtomicBool::new(false),
                timing: Mutex::new(Timing {
                    start: now,
                    stop: now,
                }),
                renderer: RwLock::new(renderer),
                on_completed: Mutex::new(on_completed),
                on_data_prepared,
                job: Mutex::new(job),
                link: RwLock::new(Link::default()),
            }),
        }
    }

    /// The display label, fixed at creation.
    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Advances the position by `delta` and checks for completion.
    pub fn step(&self, delta: i64) {
        self.inner.position.fetch_add(delta, Ordering::AcqRel);
        self.check_completed();
        self.redraw();
    }

    /// Seeds the position without running the completion check.
    ///
    /// Progress made before this value is excluded from the speed readout.
    pub fn set_initial_value(&self, value: i64) {
        self.inner.position.store(value, Ordering::Release);
        self.inner.seeded.store(value, Ordering::Release);
        self.redraw();
    }

    /// Replaces the bounds. Completion is re-evaluated on the next mutation.
    pub fn update_range(&self, lower: i64, upper: i64) {
        *self.inner.bounds.write() = (lower, upper);
        self.redraw();
    }

    /// Consistent `(lower, upper, position)` snapshot.
    pub fn bounds(&self) -> (i64, i64, i64) {
        let bounds = self.inner.bounds.read();
        let position = self.inner.position.load(Ordering::Acquire);
        (bounds.0, bounds.1, position)
    }

    /// The current position, read without locking.
    pub fn position(&self) -> i64 {
        self.inner.position.load(Ordering::Acquire)
    }

    /// Progress as a fraction in `[0, 1]`.
    ///
    /// A tracker whose upper bound does not exceed its lower bound reports a
    /// full bar.
    pub fn percent_f(&self) -> f64 {
        let (lower, upper, position) = self.bounds();
        fraction(lower, upper, position)
    }

    /// Progress as a percent string with one decimal, e.g. `"75.5%"`.
    pub fn percent(&self) -> String {
        fltfmt_percent(self.percent_f())
    }

    /// Progress rounded to the nearest integer percent.
    pub fn percent_i(&self) -> i64 {
        percent_int(self.percent_f())
    }

    /// Whether the position reached the upper bound.
    pub fn is_completed(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Whether the worker retired this tracker.
    pub fn is_retired(&self) -> bool {
        self.inner.retired.load(Ordering::Acquire)
    }

    /// Whether the worker gave up before completion.
    pub fn is_stalled(&self) -> bool {
        self.inner.stalled.load(Ordering::Acquire)
    }

    /// Completed or retired; either way no more progress is expected.
    pub fn is_done(&self) -> bool {
        self.is_completed() || self.is_retired()
    }

    /// Time between start and the last render, frozen at completion.
    pub fn elapsed(&self) -> Duration {
        let timing = self.inner.timing.lock();
        timing.stop.saturating_duration_since(timing.start)
    }

    /// Swaps the renderer for another registered style.
    ///
    /// The presentation settings of the previous renderer are carried over,
    /// except its colors, which come from the new style.
    pub fn set_style(&self, style: BarStyle) -> Result<()> {
        let mut renderer = style.build()?;
        let mut current = self.inner.renderer.write();
        let config = renderer.config_mut();
        let (base, highlight) = (config.base_color.take(), config.highlight_color.take());
        *config = current.config().clone();
        config.base_color = base;
        config.highlight_color = highlight;
        *current = renderer;
        Ok(())
    }

    /// Edits the renderer settings in place.
    pub fn configure<R>(&self, f: impl FnOnce(&mut BarConfig) -> R) -> R {
        f(self.inner.renderer.write().config_mut())
    }

    /// Renders the current line, before markup translation.
    ///
    /// While the tracker is running this also refreshes its stop time, so the
    /// elapsed readout keeps moving between updates.
    pub fn line(&self) -> String {
        let (lower, upper, position) = self.bounds();
        let completed = self.is_completed();
        let elapsed = {
            let mut timing = self.inner.timing.lock();
            if !completed {
                timing.stop = Instant::now();
            }
            timing.stop.saturating_duration_since(timing.start)
        };
        let state = BarState {
            title: &self.inner.title,
            lower,
            upper,
            position,
            transferred: position.saturating_sub(self.inner.seeded.load(Ordering::Acquire)),
            percent: fraction(lower, upper, position),
            completed,
            elapsed,
        };

        let mut data = self.inner.renderer.read().prepare(&state);
        if let Some(hook) = &self.inner.on_data_prepared {
            hook(self, &mut data);
        }
        self.inner.renderer.read().finish(&data)
    }

    /// Whether a job is bound and still has work to do.
    pub fn has_pending_job(&self) -> bool {
        // A held lock means the job is running right now.
        let bound = self.inner.job.try_lock().map_or(true, |job| job.is_some());
        !self.is_done() && !self.is_stalled() && bound
    }

    /// Polls the job once and advances by the returned delta.
    ///
    /// A failing job stalls the tracker and is not polled again.
    pub(crate) fn run_job(&self) {
        let mut job = self.inner.job.lock();
        let result = match job.as_mut() {
            Some(f) => f(self, self.position()),
            None => return,
        };
        match result {
            Ok(delta) => {
                drop(job);
                self.step(delta);
            }
            Err(e) => {
                job.take();
                drop(job);
                warn!(title = self.title(), error = %e, "job failed");
                self.mark_stalled();
            }
        }
    }

    /// Restarts the clock; used when the task thread begins.
    pub(crate) fn mark_started(&self) {
        let mut timing = self.inner.timing.lock();
        timing.start = Instant::now();
        timing.stop = timing.start;
    }

    pub(crate) fn attach(&self, link: Link) {
        *self.inner.link.write() = link;
        if self.is_done() {
            self.settle();
        }
    }

    /// Marks the tracker done without completing it.
    pub(crate) fn retire(&self) {
        if !self.inner.retired.swap(true, Ordering::AcqRel) {
            self.settle();
            self.redraw();
        }
    }

    pub(crate) fn mark_stalled(&self) {
        if !self.is_done() {
            self.inner.stalled.store(true, Ordering::Release);
            self.redraw();
        }
    }

    /// Whether this tracker was counted into its group's done counter.
    pub(crate) fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    fn check_completed(&self) {
        let upper = self.inner.bounds.read().1;
        if self.inner.position.load(Ordering::Acquire) < upper {
            return;
        }
        if self
            .inner
            .completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.inner.timing.lock().stop = Instant::now();
        self.settle();

        let callback = self.inner.on_completed.lock().take();
        if let Some(callback) = callback {
            callback(self);
        }
    }

    fn settle(&self) {
        let link = self.inner.link.read();
        if let Some(done) = &link.group_done {
            if !self.inner.settled.swap(true, Ordering::AcqRel) {
                done.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    fn redraw(&self) {
        if let Some(signal) = &self.inner.link.read().redraw {
            signal.request();
        }
    }
}

impl io::Write for Tracker {
    /// Counts the bytes as progress.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.step(buf.len() as i64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Tees an [`io::Write`] sink with a tracker: bytes written to the sink are
/// counted as progress.
///
/// ```rust,no_run
/// # use multibar::{MultiBar, TrackerBuilder, TrackerWriter};
/// # use std::io::Read;
/// # fn main() -> multibar::Result<()> {
/// let bars = MultiBar::new();
/// let tracker = bars.add(TrackerBuilder::new().title("copy").upper_bound(1024))?;
/// let mut out = TrackerWriter::new(std::io::sink(), tracker);
/// std::io::copy(&mut std::io::repeat(0).take(1024), &mut out)?;
/// # Ok(())
/// # }
/// ```
pub struct TrackerWriter<W> {
    inner: W,
    tracker: Tracker,
}

impl<W: io::Write> TrackerWriter<W> {
    /// Wraps `inner`, counting its writes on `tracker`.
    pub fn new(inner: W, tracker: Tracker) -> Self {
        Self { inner, tracker }
    }

    /// The tracker receiving the progress.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Get a reference to the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> io::Write for TrackerWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.tracker.step(n as i64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn fraction(lower: i64, upper: i64, position: i64) -> f64 {
    if upper <= lower {
        return 1.0;
    }
    // i128 keeps ranges wider than i64 from overflowing.
    let done = i128::from(position) - i128::from(lower);
    let span = i128::from(upper) - i128::from(lower);
    (done as f64 / span as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tracker(upper: i64) -> Tracker {
        TrackerBuilder::new()
            .title("t")
            .upper_bound(upper)
            .build()
            .unwrap()
            .0
    }

    #[test]
    fn test_step_to_completion() {
        let t = tracker(100);
        t.step(40);
        assert!(!t.is_completed());
        assert_eq!(t.percent(), "40.0%");
        t.step(60);
        assert!(t.is_completed());
        assert_eq!(t.percent(), "100.0%");
        assert_eq!(t.percent_i(), 100);
    }

    #[test]
    fn test_completion_is_monotonic() {
        let t = tracker(10);
        t.step(10);
        t.update_range(0, 1000);
        t.step(1);
        assert!(t.is_completed());
    }

    #[test]
    fn test_shrinking_upper_bound_completes_on_next_step() {
        let t = tracker(100);
        t.step(50);
        t.update_range(0, 20);
        assert!(!t.is_completed());
        t.step(0);
        assert!(t.is_completed());
        assert_eq!(t.percent_f(), 1.0);
    }

    #[test]
    fn test_seed_does_not_complete() {
        let t = tracker(100);
        t.set_initial_value(100);
        assert!(!t.is_completed());
        assert_eq!(t.bounds(), (0, 100, 100));
    }

    #[test]
    fn test_extreme_bounds_do_not_overflow() {
        let (t, _) = TrackerBuilder::new().range(-1, i64::MAX).build().unwrap();
        t.step(10);
        assert_eq!(t.percent(), "0.0%");
        assert!(!t.line().is_empty());
        t.set_initial_value(i64::MIN);
        t.step(-1);
        assert_eq!(t.position(), i64::MAX);
        assert!(t.is_completed());
        assert!(!t.line().is_empty());
    }

    #[test]
    fn test_empty_range_is_full() {
        let t = tracker(0);
        assert_eq!(t.percent_f(), 1.0);
        let t = TrackerBuilder::new().range(10, 5).build().unwrap().0;
        assert_eq!(t.percent(), "100.0%");
    }

    #[test]
    fn test_completion_callback_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (t, _) = {
            let calls = calls.clone();
            TrackerBuilder::new()
                .upper_bound(3)
                .on_completed(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
                .build()
                .unwrap()
        };
        let threads: Vec<_> = (0..6)
            .map(|_| {
                let t = t.clone();
                std::thread::spawn(move || t.step(1))
            })
            .collect();
        for th in threads {
            th.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(t.position(), 6);
    }

    #[test]
    fn test_write_counts_bytes() {
        let mut t = tracker(8);
        t.write_all(b"abcd").unwrap();
        assert_eq!(t.position(), 4);
        let mut w = TrackerWriter::new(Vec::new(), t.clone());
        w.write_all(b"efgh").unwrap();
        assert!(t.is_completed());
        assert_eq!(w.into_inner(), b"efgh");
    }

    #[test]
    fn test_stop_time_freezes_at_completion() {
        let t = tracker(1);
        t.step(1);
        let first = t.elapsed();
        std::thread::sleep(Duration::from_millis(15));
        t.line();
        assert_eq!(t.elapsed(), first);
    }

    #[test]
    fn test_data_prepared_hook_edits_line() {
        let (t, _) = TrackerBuilder::new()
            .title("before")
            .schema("{Title}")
            .on_data_prepared(|_, data| data.title = "after".into())
            .build()
            .unwrap();
        assert_eq!(t.line(), "after");
    }

    #[test]
    fn test_set_style_keeps_schema() {
        let (t, _) = TrackerBuilder::new()
            .schema("[{Bar}]")
            .width(4)
            .build()
            .unwrap();
        t.set_style(BarStyle::Spinner(9)).unwrap();
        t.configure(|c| c.clear_colors());
        assert_eq!(t.line(), "[|   ]");
        assert!(t.set_style(BarStyle::Stepper(99)).is_err());
    }

    #[test]
    fn test_retire_and_stall() {
        let t = tracker(10);
        t.mark_stalled();
        assert!(t.is_stalled());
        assert!(!t.is_done());
        t.retire();
        assert!(t.is_done());
        assert!(!t.is_completed());
    }

    #[test]
    fn test_group_counter_counts_once() {
        let done = Arc::new(AtomicUsize::new(0));
        let t = tracker(1);
        t.step(1);
        t.attach(Link {
            redraw: None,
            group_done: Some(done.clone()),
        });
        t.retire();
        t.step(5);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(t.is_settled());
    }
}
