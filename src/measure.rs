// SPDX-License-Identifier: MIT OR Apache-2.0

//! Measurements of built layouts in whole pixels.

use crate::Layout;

/// Width of the widest line, which can be far smaller than the width the layout was
/// constructed with
pub fn width(layout: Option<&dyn Layout>) -> i32 {
    let Some(layout) = layout else {
        return 0;
    };
    (0..layout.line_count())
        .map(|line| layout.line_right(line) as i32)
        .fold(0, i32::max)
}

/// Height of the layout, without the line spacing some backends add below the last line
pub fn height(layout: Option<&dyn Layout>) -> i32 {
    let Some(layout) = layout else {
        return 0;
    };

    let mut extra = 0;
    let mult = layout.spacing_multiplier();
    if layout.trailing_spacing_applied() && mult != 0.0 {
        let line = layout.line_count().saturating_sub(1);
        let above = layout.line_ascent(line);
        let below = layout.line_descent(line);
        let natural = (below - above) as f32;
        let original = (natural - layout.spacing_add()) / mult;
        extra = (natural - original).round() as i32;
    }
    layout.height() - extra
}

/// Leftmost position of any line, `0` when there are no lines
pub fn content_left(layout: Option<&dyn Layout>) -> i32 {
    match layout {
        Some(layout) if layout.line_count() > 0 => (0..layout.line_count())
            .map(|line| layout.line_left(line) as i32)
            .fold(i32::MAX, i32::min),
        _ => 0,
    }
}
