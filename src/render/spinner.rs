//! Cycling glyph animations.
//!
//! A spinner ignores the progress value for its bar cell: each render shows
//! the next frame of its glyph set, so the animation speed follows the redraw
//! rate.

use super::config::{paint, BarConfig, DEFAULT_SPINNER_TAIL_SPACES};
use super::{BarState, Renderer};
use crate::term::markup::escape;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of registered spinner styles.
pub fn max_spinners() -> usize {
    SPINNERS.len()
}

/// A renderer cycling through one glyph set.
#[derive(Debug)]
pub struct Spinner {
    frames: &'static [&'static str],
    tick: AtomicUsize,
    config: BarConfig,
}

impl Spinner {
    /// Creates the spinner registered at `index`, if any.
    pub fn new(index: usize) -> Option<Self> {
        let frames = *SPINNERS.get(index)?;
        Some(Self {
            frames,
            tick: AtomicUsize::new(0),
            config: BarConfig::new(
                Some("darkgray"),
                Some("lightcyan"),
                DEFAULT_SPINNER_TAIL_SPACES,
            ),
        })
    }

    /// The frames of this spinner.
    pub fn frames(&self) -> &'static [&'static str] {
        self.frames
    }
}

impl Renderer for Spinner {
    fn bar(&self, _state: &BarState<'_>) -> String {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let frame = self.frames[tick % self.frames.len()];
        let pad = self
            .config
            .width
            .saturating_sub(console::measure_text_width(frame));
        let mut bar = paint(&escape(frame), self.config.highlight_color.as_deref());
        bar.push_str(&" ".repeat(pad));
        bar
    }

    fn config(&self) -> &BarConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut BarConfig {
        &mut self.config
    }
}

#[rustfmt::skip]
static SPINNERS: [&[&str]; 76] = [
    &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
    &["▁", "▃", "▄", "▅", "▆", "▇", "█", "▇", "▆", "▅", "▄", "▃", "▁"],
    &["▖", "▘", "▝", "▗"],
    &["┤", "┘", "┴", "└", "├", "┌", "┬", "┐"],
    &["◢", "◣", "◤", "◥"],
    &["◰", "◳", "◲", "◱"],
    &["◴", "◷", "◶", "◵"],
    &["◐", "◓", "◑", "◒"],
    &[".", "o", "O", "@", "*"],
    &["|", "/", "-", "\\"],
    &["◡◡", "⊙⊙", "◠◠"],
    &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
    &[">))'>", " >))'>", "  >))'>", "   >))'>", "    >))'>", "   <'((<", "  <'((<", " <'((<"],
    &["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"],
    &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z"],
    &["▉", "▊", "▋", "▌", "▍", "▎", "▏", "▎", "▍", "▌", "▋", "▊", "▉"],
    &["■", "□", "▪", "▫"],
    &["←", "↑", "→", "↓"],
    &["╫", "╪"],
    &["⇐", "⇖", "⇑", "⇗", "⇒", "⇘", "⇓", "⇙"],
    &["⠁", "⠁", "⠉", "⠙", "⠚", "⠒", "⠂", "⠂", "⠒", "⠲", "⠴", "⠤", "⠄", "⠄", "⠤", "⠠", "⠠", "⠤", "⠦", "⠖", "⠒", "⠐", "⠐", "⠒", "⠓", "⠋", "⠉", "⠈", "⠈"],
    &["⠈", "⠉", "⠋", "⠓", "⠒", "⠐", "⠐", "⠒", "⠖", "⠦", "⠤", "⠠", "⠠", "⠤", "⠦", "⠖", "⠒", "⠐", "⠐", "⠒", "⠓", "⠋", "⠉", "⠈"],
    &["⠁", "⠉", "⠙", "⠚", "⠒", "⠂", "⠂", "⠒", "⠲", "⠴", "⠤", "⠄", "⠄", "⠤", "⠴", "⠲", "⠒", "⠂", "⠂", "⠒", "⠚", "⠙", "⠉", "⠁"],
    &["⠋", "⠙", "⠚", "⠒", "⠂", "⠂", "⠒", "⠲", "⠴", "⠦", "⠖", "⠒", "⠐", "⠐", "⠒", "⠓", "⠋"],
    &["ｦ", "ｧ", "ｨ", "ｩ", "ｪ", "ｫ", "ｬ", "ｭ", "ｮ", "ｯ", "ｱ", "ｲ", "ｳ", "ｴ", "ｵ", "ｶ", "ｷ", "ｸ", "ｹ", "ｺ", "ｻ", "ｼ", "ｽ", "ｾ", "ｿ", "ﾀ", "ﾁ", "ﾂ", "ﾃ", "ﾄ", "ﾅ", "ﾆ", "ﾇ", "ﾈ", "ﾉ", "ﾊ", "ﾋ", "ﾌ", "ﾍ", "ﾎ", "ﾏ", "ﾐ", "ﾑ", "ﾒ", "ﾓ", "ﾔ", "ﾕ", "ﾖ", "ﾗ", "ﾘ", "ﾙ", "ﾚ", "ﾛ", "ﾜ", "ﾝ"],
    &[".", "..", "..."],
    &["▁", "▂", "▃", "▄", "▅", "▆", "▇", "█", "▉", "▊", "▋", "▌", "▍", "▎", "▏", "▏", "▎", "▍", "▌", "▋", "▊", "▉", "█", "▇", "▆", "▅", "▄", "▃", "▂", "▁"],
    &[".", "o", "O", "°", "O", "o", "."],
    &["+", "x"],
    &["v", "<", "^", ">"],
    &[">>--->", " >>--->", "  >>--->", "   >>--->", "    >>--->", "    <---<<", "   <---<<", "  <---<<", " <---<<", "<---<<"],
    &["|", "||", "|||", "||||", "|||||", "|||||||", "||||||||", "|||||||", "||||||", "|||||", "||||", "|||", "||", "|"],
    &["[          ]", "[=         ]", "[==        ]", "[===       ]", "[====      ]", "[=====     ]", "[======    ]", "[=======   ]", "[========  ]", "[========= ]", "[==========]"],
    &["(*---------)", "(-*--------)", "(--*-------)", "(---*------)", "(----*-----)", "(-----*----)", "(------*---)", "(-------*--)", "(--------*-)", "(---------*)"],
    &["█▒▒▒▒▒▒▒▒▒", "███▒▒▒▒▒▒▒", "█████▒▒▒▒▒", "███████▒▒▒", "██████████"],
    &["[                    ]", "[=>                  ]", "[===>                ]", "[=====>              ]", "[======>             ]", "[========>           ]", "[==========>         ]", "[============>       ]", "[==============>     ]", "[================>   ]", "[==================> ]", "[===================>]"],
    &["ဝ", "၀"],
    &["▌", "▀", "▐▄"],
    &["🌍", "🌎", "🌏"],
    &["◜", "◝", "◞", "◟"],
    &["⬒", "⬔", "⬓", "⬕"],
    &["⬖", "⬘", "⬗", "⬙"],
    &["[>>>          >]", "[]>>>>        []", "[]  >>>>      []", "[]    >>>>    []", "[]      >>>>  []", "[]        >>>>[]", "[>>          >>]"],
    &["♠", "♣", "♥", "♦"],
    &["➞", "➟", "➠", "➡", "➠", "➟"],
    &["  |  ", " \\   ", "_    ", " \\   ", "  |  ", "   / ", "    _", "   / "],
    &["  . . . .", ".   . . .", ". .   . .", ". . .   .", ". . . .  ", ". . . . ."],
    &[" |     ", "  /    ", "   _   ", "    \\  ", "     | ", "    \\  ", "   _   ", "  /    "],
    &["⎺", "⎻", "⎼", "⎽", "⎼", "⎻"],
    &["▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸"],
    &["[    ]", "[   =]", "[  ==]", "[ ===]", "[====]", "[=== ]", "[==  ]", "[=   ]"],
    &["( ●    )", "(  ●   )", "(   ●  )", "(    ● )", "(     ●)", "(    ● )", "(   ●  )", "(  ●   )", "( ●    )"],
    &["✶", "✸", "✹", "✺", "✹", "✷"],
    &["▐|\\____________▌", "▐_|\\___________▌", "▐__|\\__________▌", "▐___|\\_________▌", "▐____|\\________▌", "▐_____|\\_______▌", "▐______|\\______▌", "▐_______|\\_____▌", "▐________|\\____▌", "▐_________|\\___▌", "▐__________|\\__▌", "▐___________|\\_▌", "▐____________|\\▌", "▐____________/|▌", "▐___________/|_▌", "▐__________/|__▌", "▐_________/|___▌", "▐________/|____▌", "▐_______/|_____▌", "▐______/|______▌", "▐_____/|_______▌", "▐____/|________▌", "▐___/|_________▌", "▐__/|__________▌", "▐_/|___________▌", "▐/|____________▌"],
    &["▐⠂       ▌", "▐⠈       ▌", "▐ ⠂      ▌", "▐ ⠠      ▌", "▐  ⡀     ▌", "▐  ⠠     ▌", "▐   ⠂    ▌", "▐   ⠈    ▌", "▐    ⠂   ▌", "▐    ⠠   ▌", "▐     ⡀  ▌", "▐     ⠠  ▌", "▐      ⠂ ▌", "▐      ⠈ ▌", "▐       ⠂▌", "▐       ⠠▌", "▐       ⡀▌", "▐      ⠠ ▌", "▐      ⠂ ▌", "▐     ⠈  ▌", "▐     ⠂  ▌", "▐    ⠠   ▌", "▐    ⡀   ▌", "▐   ⠠    ▌", "▐   ⠂    ▌", "▐  ⠈     ▌", "▐  ⠂     ▌", "▐ ⠠      ▌", "▐ ⡀      ▌", "▐⠠       ▌"],
    &["¿", "?"],
    &["⢹", "⢺", "⢼", "⣸", "⣇", "⡧", "⡗", "⡏"],
    &["⢄", "⢂", "⢁", "⡁", "⡈", "⡐", "⡠"],
    &[".  ", ".. ", "...", " ..", "  .", "   "],
    &[".", "o", "O", "°", "O", "o", "."],
    &["▓", "▒", "░"],
    &["▌", "▀", "▐", "▄"],
    &["⊶", "⊷"],
    &["▪", "▫"],
    &["□", "■"],
    &["▮", "▯"],
    &["-", "=", "≡"],
    &["d", "q", "p", "b"],
    &["∙∙∙", "●∙∙", "∙●∙", "∙∙●", "∙∙∙"],
    &["🌑 ", "🌒 ", "🌓 ", "🌔 ", "🌕 ", "🌖 ", "🌗 ", "🌘 "],
    &["☗", "☖"],
    &["⧇", "⧆"],
    &["◉", "◎"],
    &["㊂", "㊀", "㊁"],
    &["⦾", "⦿"],
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> BarState<'static> {
        BarState {
            title: "t",
            lower: 0,
            upper: 10,
            position: 3,
            transferred: 3,
            percent: 0.3,
            completed: false,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_registered_sets() {
        assert_eq!(max_spinners(), 76);
        assert!(SPINNERS.iter().all(|frames| !frames.is_empty()));
        assert!(Spinner::new(76).is_none());
    }

    #[test]
    fn test_cycles_on_every_render() {
        let mut s = Spinner::new(9).unwrap();
        s.config_mut().clear_colors();
        s.config_mut().set_width(1);
        let frames: Vec<String> = (0..5).map(|_| s.bar(&state())).collect();
        assert_eq!(frames, ["|", "/", "-", "\\", "|"]);
    }

    #[test]
    fn test_frame_is_padded_to_width() {
        let mut s = Spinner::new(26).unwrap();
        s.config_mut().clear_colors();
        s.config_mut().set_width(4);
        assert_eq!(s.bar(&state()), ".   ");
        assert_eq!(s.bar(&state()), "..  ");
    }

    #[test]
    fn test_markup_like_frames_are_escaped() {
        let mut s = Spinner::new(12).unwrap();
        s.config_mut().clear_colors();
        s.config_mut().set_width(1);
        for _ in 0..5 {
            s.bar(&state());
        }
        assert_eq!(s.bar(&state()), "   &lt;'((&lt;");
    }
}
