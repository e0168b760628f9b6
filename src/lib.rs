//! Multibar renders many live-updating progress bars and spinners on one
//! terminal, redrawn in place by a single background thread.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use multibar::{MultiBar, TrackerBuilder};
//! use std::{thread, time::Duration};
//!
//! # fn main() -> multibar::Result<()> {
//! let bars = MultiBar::builder().on_done(|bars| bars.close()).build();
//! let tracker = bars.add(
//!     TrackerBuilder::new()
//!         .title("compile")
//!         .upper_bound(100)
//!         .stepper(0)
//!         .worker(|tracker, exit| {
//!             while !tracker.is_completed() && !exit.is_set() {
//!                 tracker.step(1);
//!                 thread::sleep(Duration::from_millis(20));
//!             }
//!             false
//!         }),
//! )?;
//! # let _ = tracker;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`tracker`] - A single bar: bounds, position, completion and hooks
//! - [`render`] - Stepper and spinner renderers and the line template
//! - [`multibar`] - The coordinator owning the trackers and the redraw loop
//! - [`task`] - Background workers bound to trackers, with a wait group
//! - [`download`] - Resumable HTTP downloads as tasks
//! - [`term`] - Terminal cursor control and markup translation
//! - [`http`] - HTTP client with retry and tracing middleware
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`utils`] - Number, size and duration formatting

pub mod download;
pub mod error;
pub mod global;
pub mod http;
pub mod multibar;
pub mod render;
pub mod task;
pub mod term;
pub mod tracker;
pub mod utils;

pub use download::{DownloadTask, DownloadTasks, DownloadTasksBuilder};
pub use error::{Error, Result};
pub use global::{add, default_multibar};
pub use http::{create_http_client, HttpClientConfig};
pub use multibar::{ExitSignal, Group, MultiBar, MultiBarBuilder};
pub use render::{max_spinners, max_steppers, BarStyle, Renderer, SchemaData};
pub use task::{TaskBuilder, Tasks, WaitGroup};
pub use term::{AnsiTerminal, Terminal};
pub use tracker::{Tracker, TrackerBuilder, TrackerWriter};
