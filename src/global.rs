//! The process-wide default coordinator.
//!
//! Created on first use, painting to standard output. Closing it is final:
//! later calls to [`add`] fail with [`Error::Closed`](crate::Error::Closed).

use crate::multibar::MultiBar;
use crate::tracker::{Tracker, TrackerBuilder};
use crate::Result;

use std::sync::OnceLock;

static DEFAULT: OnceLock<MultiBar> = OnceLock::new();

/// The shared default coordinator.
pub fn default_multibar() -> &'static MultiBar {
    DEFAULT.get_or_init(MultiBar::new)
}

/// Adds a tracker to the default coordinator.
///
/// ```rust,no_run
/// # fn main() -> multibar::Result<()> {
/// let tracker = multibar::add(multibar::TrackerBuilder::new().title("build").upper_bound(3))?;
/// tracker.step(3);
/// multibar::default_multibar().close();
/// # Ok(())
/// # }
/// ```
pub fn add(builder: TrackerBuilder) -> Result<Tracker> {
    default_multibar().add(builder)
}
