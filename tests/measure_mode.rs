use std::sync::Arc;

use text_layout_builder::{LayoutError, MeasureMode, TextLayoutBuilder};

mod common;

use common::{builder, LONG_TEXT};

// 10px text advances 5px per grapheme, the widest line of LONG_TEXT has 32 graphemes
const LONG_TEXT_WIDTH: i32 = 160;

fn long_text_builder() -> TextLayoutBuilder {
    let (mut builder, _) = builder();
    builder.set_text(LONG_TEXT).unwrap().set_text_size(10.0);
    builder
}

#[test]
fn unspecified() {
    let mut builder = long_text_builder();
    let layout = builder
        .set_width_with_mode(20, MeasureMode::Unspecified)
        .build()
        .unwrap()
        .unwrap();
    assert_eq!(layout.width(), LONG_TEXT_WIDTH);
}

#[test]
fn exactly() {
    let mut builder = long_text_builder();
    let layout = builder
        .set_width_with_mode(20, MeasureMode::Exactly)
        .build()
        .unwrap()
        .unwrap();
    assert_eq!(layout.width(), 20);
}

#[test]
fn at_most_long_text() {
    let mut builder = long_text_builder();
    let layout = builder
        .set_width_with_mode(20, MeasureMode::AtMost)
        .build()
        .unwrap()
        .unwrap();
    assert_eq!(layout.width(), 20);
}

#[test]
fn at_most_short_text() {
    let mut builder = long_text_builder();
    let layout = builder
        .set_text("Hi")
        .unwrap()
        .set_width_with_mode(20, MeasureMode::AtMost)
        .build()
        .unwrap()
        .unwrap();
    assert_eq!(layout.width(), 10);
}

#[test]
fn non_positive_width_measures_content() {
    let mut builder = long_text_builder();
    let layout = builder.set_width(-1).build().unwrap().unwrap();
    assert_eq!(builder.measure_mode(), MeasureMode::Unspecified);
    assert_eq!(layout.width(), LONG_TEXT_WIDTH);
}

#[test]
fn mode_change_rebuilds() {
    let mut builder = long_text_builder();
    let exact = builder
        .set_width_with_mode(20, MeasureMode::Exactly)
        .build()
        .unwrap()
        .unwrap();
    let at_most = builder
        .set_width_with_mode(20, MeasureMode::AtMost)
        .build()
        .unwrap()
        .unwrap();
    assert!(!Arc::ptr_eq(&exact, &at_most));
}

#[test]
fn raw_modes() {
    assert_eq!(MeasureMode::try_from(0), Ok(MeasureMode::Unspecified));
    assert_eq!(MeasureMode::try_from(1), Ok(MeasureMode::Exactly));
    assert_eq!(MeasureMode::try_from(2), Ok(MeasureMode::AtMost));
    assert_eq!(
        MeasureMode::try_from(-3),
        Err(LayoutError::UnknownMeasureMode(-3))
    );
}
