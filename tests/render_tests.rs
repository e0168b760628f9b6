//! Tests for renderers, templates and markup translation.

use multibar::render::{BarState, BarStyle, SchemaData, Template, DEFAULT_SCHEMA};
use multibar::term::{MarkupTranslator, Translator};
use multibar::{max_spinners, max_steppers, Error, TrackerBuilder};
use std::time::Duration;

mod common;
use common::helpers::*;

fn state(percent: f64, completed: bool) -> BarState<'static> {
    BarState {
        title: "render",
        lower: 0,
        upper: 100,
        position: (percent * 100.0) as i64,
        transferred: 0,
        percent,
        completed,
        elapsed: Duration::ZERO,
    }
}

#[test]
fn test_registered_styles() {
    assert_eq!(max_steppers(), 4);
    assert_eq!(max_spinners(), 76);
    assert!(BarStyle::Stepper(max_steppers()).build().is_err());
    assert!(BarStyle::Spinner(max_spinners() - 1).build().is_ok());
}

#[test]
fn test_stepper_fills_through_tracker() {
    let (bars, _out) = capture();
    let tracker = bars
        .add(
            TrackerBuilder::new()
                .title("fill")
                .upper_bound(4)
                .stepper(3)
                .width(10)
                .schema("[{Bar}]"),
        )
        .unwrap();
    tracker.configure(|c| c.clear_colors());

    assert_eq!(tracker.line(), "[>         ]");
    tracker.step(1);
    assert_eq!(tracker.line(), "[==>       ]");
    tracker.step(1);
    assert_eq!(tracker.line(), "[=====>    ]");
    tracker.step(2);
    assert_eq!(tracker.line(), "[==========]");
    bars.close();
}

#[test]
fn test_stepper_colors_translate() {
    let mut renderer = BarStyle::Stepper(0).build().unwrap();
    renderer.config_mut().set_width(4);
    let bar = renderer.bar(&state(0.0, false));
    assert!(bar.contains("<darkgray>"), "bar: {bar:?}");

    let plain = MarkupTranslator::no_color().translate(&bar);
    assert_eq!(plain, "╺━━━");
    let colored = MarkupTranslator::new(true).translate(&bar);
    assert_eq!(console::strip_ansi_codes(&colored), "╺━━━");
}

#[test]
fn test_spinner_cycles_frames() {
    let mut renderer = BarStyle::Spinner(0).build().unwrap();
    renderer.config_mut().clear_colors();
    renderer.config_mut().set_width(1);
    let frames: Vec<String> = (0..9).map(|_| renderer.bar(&state(0.0, false))).collect();
    assert_eq!(&frames[..3], ["←", "↖", "↑"]);
    assert_eq!(frames[8], frames[0]);
}

#[test]
fn test_spinner_frames_are_padded() {
    let mut renderer = BarStyle::Spinner(0).build().unwrap();
    renderer.config_mut().clear_colors();
    renderer.config_mut().set_width(5);
    assert_eq!(renderer.bar(&state(0.0, false)), "←    ");
}

#[test]
fn test_spinner_line_has_tail_spaces() {
    let mut renderer = BarStyle::Spinner(2).build().unwrap();
    renderer.config_mut().set_schema("{Title}").unwrap();
    let line = renderer.finish(&renderer.prepare(&state(0.5, false)));
    assert_eq!(line, format!("render{}", " ".repeat(8)));
}

#[test]
fn test_default_schema_fields() {
    let mut renderer = BarStyle::Stepper(2).build().unwrap();
    renderer.config_mut().clear_colors();
    renderer.config_mut().set_width(4);
    renderer.config_mut().set_prepend("»");
    renderer.config_mut().set_append("«");
    let mut data = renderer.prepare(&state(0.5, false));
    data.speed = "0 B/s".into();
    data.elapsed = "1.0s".into();
    assert_eq!(
        renderer.finish(&data),
        "    » +++- 50.0% | render | 50.0 B/100.0 B 0 B/s 1.0s «"
    );
}

#[test]
fn test_template_escapes_and_errors() {
    let template = Template::parse("{{{Percent}}} {Title}").unwrap();
    let data = SchemaData {
        percent: "50.0%".into(),
        title: "t".into(),
        ..SchemaData::default()
    };
    assert_eq!(template.render(&data), "{50.0%} t");
    assert_eq!(Template::parse(DEFAULT_SCHEMA).unwrap(), Template::default());

    assert!(matches!(Template::parse("{Unknown}"), Err(Error::Template(_))));
    assert!(matches!(Template::parse("{Bar"), Err(Error::Template(_))));
}

#[test]
fn test_unknown_total_is_shown_as_question_mark() {
    let renderer = BarStyle::Stepper(0).build().unwrap();
    let mut s = state(0.0, false);
    s.upper = multibar::render::UNKNOWN_TOTAL;
    assert_eq!(renderer.prepare(&s).total, "?");
}
