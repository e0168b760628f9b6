//! Builder for [`Tracker`] instances.
//!
//! The builder collects everything a tracker needs before it joins a
//! coordinator: bounds, title, renderer style and presentation settings, and
//! the task hooks the coordinator runs on a background thread.
//!
//! # Examples
//!
//! ```rust,no_run
//! use multibar::{BarStyle, MultiBar, TrackerBuilder};
//! use std::time::Duration;
//!
//! # fn main() -> multibar::Result<()> {
//! let bars = MultiBar::new();
//! bars.add(
//!     TrackerBuilder::new()
//!         .title("compile")
//!         .upper_bound(100)
//!         .style(BarStyle::Stepper(1))
//!         .worker(|tracker, exit| {
//!             while !tracker.is_completed() && !exit.wait_timeout(Duration::from_millis(20)) {
//!                 tracker.step(1);
//!             }
//!             false
//!         }),
//! )?;
//! # Ok(())
//! # }
//! ```

use super::{Job, OnCompleted, OnDataPrepared, OnStart, Tracker, Worker};
use crate::multibar::signal::ExitSignal;
use crate::render::{BarStyle, Renderer, SchemaData};
use crate::Result;

/// Background parts of a tracker, started by the coordinator.
#[derive(Default)]
pub(crate) struct TaskHooks {
    pub(crate) worker: Option<Worker>,
    pub(crate) on_start: Option<OnStart>,
}

impl std::fmt::Debug for TaskHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHooks")
            .field("worker", &self.worker.is_some())
            .field("on_start", &self.on_start.is_some())
            .finish()
    }
}

impl TaskHooks {
    pub(crate) fn is_empty(&self) -> bool {
        self.worker.is_none() && self.on_start.is_none()
    }
}

type RendererInit = Box<dyn FnOnce(&mut dyn Renderer) + Send>;

/// A builder used to create a [`Tracker`].
pub struct TrackerBuilder {
    title: String,
    lower: i64,
    upper: i64,
    initial: Option<i64>,
    style: BarStyle,
    width: Option<usize>,
    schema: Option<String>,
    indent: Option<String>,
    prepend: Option<String>,
    append: Option<String>,
    base_color: Option<String>,
    highlight_color: Option<String>,
    tail_spaces: Option<usize>,
    renderer_init: Option<RendererInit>,
    on_completed: Option<OnCompleted>,
    on_data_prepared: Option<OnDataPrepared>,
    job: Option<Job>,
    task: TaskHooks,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self {
            title: String::new(),
            lower: 0,
            upper: 100,
            initial: None,
            style: BarStyle::default(),
            width: None,
            schema: None,
            indent: None,
            prepend: None,
            append: None,
            base_color: None,
            highlight_color: None,
            tail_spaces: None,
            renderer_init: None,
            on_completed: None,
            on_data_prepared: None,
            job: None,
            task: TaskHooks::default(),
        }
    }
}

impl TrackerBuilder {
    /// Creates a builder for a `[0, 100]` stepper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display label.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets both bounds.
    pub fn range(mut self, lower: i64, upper: i64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Sets the value at which the bar is empty.
    pub fn lower_bound(mut self, lower: i64) -> Self {
        self.lower = lower;
        self
    }

    /// Sets the value at which the tracker completes.
    pub fn upper_bound(mut self, upper: i64) -> Self {
        self.upper = upper;
        self
    }

    /// Seeds the starting position.
    pub fn initial_value(mut self, value: i64) -> Self {
        self.initial = Some(value);
        self
    }

    /// Selects the renderer.
    pub fn style(mut self, style: BarStyle) -> Self {
        self.style = style;
        self
    }

    /// Uses the stepper bar registered at `index`.
    pub fn stepper(self, index: usize) -> Self {
        self.style(BarStyle::Stepper(index))
    }

    /// Uses the spinner registered at `index`.
    pub fn spinner(self, index: usize) -> Self {
        self.style(BarStyle::Spinner(index))
    }

    /// Sets the bar width in columns.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the text schema, see [`Template`](crate::render::Template).
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the leading indent of the line.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Sets the text shown before the bar.
    pub fn prepend(mut self, text: impl Into<String>) -> Self {
        self.prepend = Some(text.into());
        self
    }

    /// Sets the text shown after the bar.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        self.append = Some(text.into());
        self
    }

    /// Sets the color of the unfilled part, by name.
    pub fn base_color(mut self, color: impl Into<String>) -> Self {
        self.base_color = Some(color.into());
        self
    }

    /// Sets the color of the filled part, by name.
    pub fn highlight_color(mut self, color: impl Into<String>) -> Self {
        self.highlight_color = Some(color.into());
        self
    }

    /// Sets how many spaces are appended after every rendered line.
    pub fn tail_spaces(mut self, n: usize) -> Self {
        self.tail_spaces = Some(n);
        self
    }

    /// Runs `f` on the renderer after all other settings were applied.
    pub fn on_renderer_init<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut dyn Renderer) + Send + 'static,
    {
        self.renderer_init = Some(Box::new(f));
        self
    }

    /// Sets the background job of this tracker.
    ///
    /// The worker runs on its own thread once the tracker joins a
    /// coordinator. It should poll the exit signal between blocking steps.
    /// Returning `true` retires the tracker; returning `false` before the
    /// tracker completed marks it stalled.
    pub fn worker<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker, &ExitSignal) -> bool + Send + 'static,
    {
        self.task.worker = Some(Box::new(f));
        self
    }

    /// Runs on the task thread before the worker.
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker, &ExitSignal) + Send + 'static,
    {
        self.task.on_start = Some(Box::new(f));
        self
    }

    /// Binds a job polled by [`MultiBar::run`](crate::MultiBar::run).
    ///
    /// Unlike a [`worker`](Self::worker), a job gets no thread of its own:
    /// the run loop calls it again and again with the current position and
    /// advances the tracker by the returned delta until it completes. An
    /// error stalls the tracker.
    pub fn job<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Tracker, i64) -> Result<i64> + Send + 'static,
    {
        self.job = Some(Box::new(f));
        self
    }

    /// Runs once when the tracker first reaches its upper bound.
    pub fn on_completed<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker) + Send + 'static,
    {
        self.on_completed = Some(Box::new(f));
        self
    }

    /// Lets `f` edit the schema values before each render.
    pub fn on_data_prepared<F>(mut self, f: F) -> Self
    where
        F: Fn(&Tracker, &mut SchemaData) + Send + Sync + 'static,
    {
        self.on_data_prepared = Some(Box::new(f));
        self
    }

    pub(crate) fn default_indent(mut self, indent: &str) -> Self {
        if self.indent.is_none() {
            self.indent = Some(indent.to_string());
        }
        self
    }

    pub(crate) fn wrap_on_completed<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Tracker) + Send + 'static,
    {
        let previous = self.on_completed.take();
        self.on_completed = Some(Box::new(move |tracker: &Tracker| {
            if let Some(previous) = previous {
                previous(tracker);
            }
            f(tracker);
        }));
        self
    }

    /// Creates the tracker and hands back its task hooks.
    ///
    /// Fails on an unknown style index, an unknown color name or a malformed
    /// schema.
    pub(crate) fn build(self) -> Result<(Tracker, TaskHooks)> {
        let mut renderer = self.style.build()?;
        {
            let config = renderer.config_mut();
            if let Some(width) = self.width {
                config.set_width(width);
            }
            if let Some(schema) = &self.schema {
                config.set_schema(schema)?;
            }
            if let Some(indent) = self.indent {
                config.set_indent(indent);
            }
            if let Some(prepend) = self.prepend {
                config.set_prepend(prepend);
            }
            if let Some(append) = self.append {
                config.set_append(append);
            }
            if let Some(color) = &self.base_color {
                config.set_base_color(color)?;
            }
            if let Some(color) = &self.highlight_color {
                config.set_highlight_color(color)?;
            }
            if let Some(n) = self.tail_spaces {
                config.set_tail_spaces(n);
            }
        }
        if let Some(init) = self.renderer_init {
            init(renderer.as_mut());
        }

        let tracker = Tracker::new(
            self.title,
            (self.lower, self.upper),
            self.initial.unwrap_or(self.lower),
            renderer,
            self.on_completed,
            self.on_data_prepared,
            self.job,
        );
        Ok((tracker, self.task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults() {
        let (t, task) = TrackerBuilder::new().build().unwrap();
        assert_eq!(t.bounds(), (0, 100, 0));
        assert!(task.is_empty());
    }

    #[test]
    fn test_bad_schema_fails_at_build() {
        let err = TrackerBuilder::new().schema("{Bar").build().unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_bad_style_fails_at_build() {
        let err = TrackerBuilder::new().spinner(1000).build().unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = TrackerBuilder::new().base_color("mauve").build().unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_initial_value() {
        let (t, _) = TrackerBuilder::new()
            .range(10, 20)
            .initial_value(15)
            .build()
            .unwrap();
        assert_eq!(t.bounds(), (10, 20, 15));
        assert_eq!(t.percent(), "50.0%");
    }

    #[test]
    fn test_renderer_init_runs_last() {
        let (t, _) = TrackerBuilder::new()
            .schema("{Title}")
            .title("x")
            .on_renderer_init(|r| r.config_mut().set_prepend(">"))
            .build()
            .unwrap();
        t.configure(|c| assert_eq!(c.prepend(), ">"));
        assert_eq!(t.line(), "x");
    }

    #[test]
    fn test_worker_is_kept() {
        let (_, task) = TrackerBuilder::new().worker(|_, _| true).build().unwrap();
        assert!(task.worker.is_some());
        assert!(!task.is_empty());
    }
}
