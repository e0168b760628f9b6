//! Continuous-fill bars with half-glyph resolution.

use super::config::{paint, BarConfig};
use super::{BarState, Renderer};

/// Glyphs and default colors of one stepper style.
#[derive(Debug, Clone, Copy)]
struct Glyphs {
    unread: &'static str,
    read: &'static str,
    left_half: &'static str,
    right_half: &'static str,
    base: &'static str,
    highlight: &'static str,
}

const STEPPERS: [Glyphs; 4] = [
    // pip installer style
    Glyphs {
        unread: "━",
        read: "━",
        left_half: "╺",
        right_half: "╸",
        base: "darkgray",
        highlight: "yellow",
    },
    Glyphs {
        unread: "▒",
        read: "▉",
        left_half: "▒",
        right_half: "▌",
        base: "darkgray",
        highlight: "lightcyan",
    },
    Glyphs {
        unread: "-",
        read: "+",
        left_half: "+",
        right_half: "+",
        base: "darkgray",
        highlight: "yellow",
    },
    Glyphs {
        unread: " ",
        read: "=",
        left_half: ">",
        right_half: ">",
        base: "darkgray",
        highlight: "yellow",
    },
];

/// Number of registered stepper styles.
pub fn max_steppers() -> usize {
    STEPPERS.len()
}

/// A bar that fills from left to right.
///
/// The fill is computed at twice the bar width so a boundary glyph can show
/// half a cell: an even step count draws the left-half glyph in the base
/// color, an odd one the right-half glyph in the highlight color.
#[derive(Debug, Clone)]
pub struct Stepper {
    glyphs: Glyphs,
    config: BarConfig,
}

impl Stepper {
    /// Creates the stepper registered at `index`, if any.
    pub fn new(index: usize) -> Option<Self> {
        let glyphs = *STEPPERS.get(index)?;
        Some(Self {
            glyphs,
            config: BarConfig::new(Some(glyphs.base), Some(glyphs.highlight), 0),
        })
    }
}

impl Renderer for Stepper {
    fn bar(&self, state: &BarState<'_>) -> String {
        let width = self.config.width;
        let steps = (state.percent.clamp(0.0, 1.0) * width as f64 * 2.0) as usize;
        let half = steps % 2 == 0;
        let pos = (steps / 2).min(width);

        let base = self.config.base_color.as_deref();
        let highlight = self.config.highlight_color.as_deref();

        let mut bar = paint(&self.glyphs.read.repeat(pos), highlight);
        if !state.completed && pos < width {
            if half {
                bar.push_str(&paint(self.glyphs.left_half, base));
            } else {
                bar.push_str(&paint(self.glyphs.right_half, highlight));
            }
            bar.push_str(&paint(&self.glyphs.unread.repeat(width - pos - 1), base));
        }
        bar
    }

    fn config(&self) -> &BarConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut BarConfig {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state(percent: f64, completed: bool) -> BarState<'static> {
        BarState {
            title: "t",
            lower: 0,
            upper: 100,
            position: (percent * 100.0) as i64,
            transferred: 0,
            percent,
            completed,
            elapsed: Duration::ZERO,
        }
    }

    fn plain(index: usize) -> Stepper {
        let mut s = Stepper::new(index).unwrap();
        s.config_mut().clear_colors();
        s.config_mut().set_width(10);
        s
    }

    #[test]
    fn test_empty_bar() {
        assert_eq!(plain(3).bar(&state(0.0, false)), ">         ");
        assert_eq!(plain(2).bar(&state(0.0, false)), "+---------");
    }

    #[test]
    fn test_half_steps() {
        // 0.45 * 20 = 9 steps: four full cells and a right half.
        assert_eq!(plain(1).bar(&state(0.45, false)), "▉▉▉▉▌▒▒▒▒▒");
        // 0.5 * 20 = 10 steps: five full cells and a left half.
        assert_eq!(plain(1).bar(&state(0.5, false)), "▉▉▉▉▉▒▒▒▒▒");
    }

    #[test]
    fn test_completed_bar_is_full() {
        assert_eq!(plain(3).bar(&state(1.0, true)), "==========");
    }

    #[test]
    fn test_full_but_not_completed_keeps_width() {
        assert_eq!(plain(3).bar(&state(1.0, false)), "==========");
    }

    #[test]
    fn test_colored_bar_uses_markup() {
        let s = Stepper::new(0).unwrap();
        let bar = s.bar(&state(0.5, false));
        assert!(bar.starts_with("<yellow>"));
        assert!(bar.contains("<darkgray>╺</darkgray>"));
    }

    #[test]
    fn test_unknown_index() {
        assert!(Stepper::new(max_steppers()).is_none());
    }
}
