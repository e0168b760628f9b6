//! In-place repainting of the tracker list.
//!
//! Each paint rewinds the cursor over the live region drawn by the previous
//! paint and writes every live line again. Rows that are done for good are
//! written one last time and then left above the live region, so they are
//! no longer counted when rewinding.

use super::group::Group;
use crate::term::{markup::escape, Terminal, Translator};
use crate::tracker::Tracker;
use std::{
    io::{self, Write},
    panic::{self, AssertUnwindSafe},
};
use tracing::warn;

/// Column count used to return the cursor to the start of the line.
const REWIND_COLUMNS: usize = 1000;

pub(crate) struct PaintState {
    pub(crate) term: Box<dyn Terminal>,
    /// Set after the first paint; until then there is nothing to rewind.
    drawn: bool,
    /// Lines of the live region drawn by the previous paint.
    rewind: usize,
    /// Leading flat rows already left above the live region.
    pinned_rows: usize,
}

impl PaintState {
    pub(crate) fn new(term: Box<dyn Terminal>) -> Self {
        Self {
            term,
            drawn: false,
            rewind: 0,
            pinned_rows: 0,
        }
    }

    /// Keeps the pinned prefix in step with a removal from the flat list.
    pub(crate) fn row_removed(&mut self, index: usize) {
        if index < self.pinned_rows {
            self.pinned_rows -= 1;
        }
    }

    pub(crate) fn live_lines(&self) -> usize {
        self.rewind
    }

    /// Paints a flat list. Returns whether every tracker is done.
    pub(crate) fn paint_flat(
        &mut self,
        trackers: &[Tracker],
        translator: &dyn Translator,
    ) -> io::Result<bool> {
        let start = self.pinned_rows.min(trackers.len());
        let live = &trackers[start..];
        let lines: Vec<String> = live.iter().map(|t| render_line(t, translator)).collect();
        let all_done = trackers.iter().all(Tracker::is_done);

        let rewind = if all_done {
            self.pinned_rows = trackers.len();
            0
        } else {
            lines.len()
        };
        self.write_frame(&lines, rewind)?;
        Ok(all_done)
    }

    /// Paints grouped trackers. Returns whether every group is done.
    ///
    /// Groups that completed since the previous paint are written first and
    /// pinned; the remaining groups form the new live region.
    pub(crate) fn paint_grouped(
        &mut self,
        groups: &[Group],
        translator: &dyn Translator,
    ) -> io::Result<bool> {
        let mut finished = Vec::new();
        let mut active = Vec::new();
        for group in groups.iter().filter(|g| !g.is_pinned()) {
            let mut block = Vec::with_capacity(group.len() + 1);
            block.push(translator.translate(&escape(group.name())));
            block.extend(group.trackers().iter().map(|t| render_line(t, translator)));
            if group.all_done() {
                group.pin();
                finished.extend(block);
            } else {
                active.extend(block);
            }
        }
        let rewind = active.len();
        finished.extend(active);
        self.write_frame(&finished, rewind)?;
        Ok(groups.iter().all(Group::all_done))
    }

    /// Writes raw bytes between paints.
    ///
    /// The live region is treated as scrolled away: the next paint starts
    /// below the written text.
    pub(crate) fn write_through(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.term.write(buf)?;
        self.drawn = false;
        self.rewind = 0;
        Ok(n)
    }

    fn write_frame(&mut self, lines: &[String], rewind: usize) -> io::Result<()> {
        if self.drawn {
            self.term.move_left(REWIND_COLUMNS)?;
            self.term.move_up(self.rewind)?;
        }
        for line in lines {
            self.term.write_all(line.as_bytes())?;
            self.term.write_all(b"\n")?;
        }
        if lines.len() < self.rewind {
            self.term.clear_below()?;
        }
        self.term.flush()?;
        self.drawn = true;
        self.rewind = rewind;
        Ok(())
    }
}

/// Renders one tracker. A panicking hook or renderer yields an empty line.
fn render_line(tracker: &Tracker, translator: &dyn Translator) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| tracker.line())) {
        Ok(line) => translator.translate(&line),
        Err(_) => {
            warn!(title = tracker.title(), "rendering panicked");
            String::new()
        }
    }
}
