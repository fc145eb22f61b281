// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use core::ops::Range;
use std::sync::Arc;

use crate::{
    Alignment, BackendError, BreakStrategy, Color, Ellipsize, HyphenationFrequency,
    JustificationMode, LayoutText, TextDirection, TextStyle,
};

bitflags::bitflags! {
    /// Construction paths and options a backend supports
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct BackendCaps: u32 {
        /// Full builder: max lines, direction, break strategy, hyphenation and indents
        const MAX_LINES_BUILDER = 1;
        /// Constructor taking max lines and direction; may still fail to link at call time
        const CAPPED_CONSTRUCTOR = 2;
        const JUSTIFICATION = 4;
        const FALLBACK_LINE_SPACING = 8;
    }
}

/// Which construction path a [`LayoutRequest`] was issued through
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConstructionPath {
    Builder,
    Capped,
    /// Public baseline constructor; ignores the line cap
    Baseline,
}

/// Font metrics of a style, baseline relative (ascent and top are negative)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    pub top: f32,
    pub ascent: f32,
    pub descent: f32,
    pub bottom: f32,
    pub leading: f32,
}

impl FontMetrics {
    /// Metrics without padding or leading
    pub fn new(ascent: f32, descent: f32) -> Self {
        Self {
            top: ascent,
            ascent,
            descent,
            bottom: descent,
            leading: 0.0,
        }
    }

    /// Recommended distance between baselines
    pub fn line_spacing(&self) -> f32 {
        self.descent - self.ascent + self.leading
    }

    /// Recommended distance between baselines, rounded out to whole pixels
    pub fn line_spacing_int(&self) -> i32 {
        self.descent.ceil() as i32 - self.ascent.floor() as i32 + self.leading.round() as i32
    }
}

/// Result of single line fast path detection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoringMetrics {
    /// Advance width of the whole text
    pub width: f32,
    pub metrics: FontMetrics,
}

/// All inputs of one backend construction call
#[derive(Clone, Debug)]
pub struct LayoutRequest<'a> {
    pub path: ConstructionPath,
    pub text: &'a LayoutText,
    /// Byte range of `text` to lay out
    pub range: Range<usize>,
    pub style: &'a Arc<TextStyle>,
    pub width: i32,
    pub alignment: Alignment,
    pub spacing_mult: f32,
    pub spacing_add: f32,
    pub include_padding: bool,
    pub ellipsize: Option<Ellipsize>,
    pub ellipsis_width: i32,
    pub max_lines: usize,
    pub direction: TextDirection,
    pub break_strategy: BreakStrategy,
    pub hyphenation_frequency: HyphenationFrequency,
    pub justification_mode: JustificationMode,
    pub left_indents: Option<&'a [i32]>,
    pub right_indents: Option<&'a [i32]>,
    pub use_line_spacing_from_fallbacks: bool,
}

/// An immutable multi-line text placement.
///
/// Line offsets are byte offsets into [`Layout::text`]. Line indices past
/// [`Layout::line_count`] panic.
pub trait Layout: Send + Sync + fmt::Debug {
    fn text(&self) -> &LayoutText;
    fn style(&self) -> &Arc<TextStyle>;
    /// Width the layout was constructed with
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn alignment(&self) -> Alignment;
    fn spacing_multiplier(&self) -> f32;
    fn spacing_add(&self) -> f32;

    fn line_count(&self) -> usize;
    fn line_start(&self, line: usize) -> usize;
    fn line_end(&self, line: usize) -> usize;
    fn line_top(&self, line: usize) -> i32;
    fn line_bottom(&self, line: usize) -> i32;
    /// Distance from the baseline to the top of the line, usually negative
    fn line_ascent(&self, line: usize) -> i32;
    /// Distance from the baseline to the bottom of the line, including spacing
    fn line_descent(&self, line: usize) -> i32;
    fn line_left(&self, line: usize) -> f32;
    fn line_right(&self, line: usize) -> f32;
    fn is_rtl(&self, line: usize) -> bool;
    /// Offset of the ellipsis relative to the line start
    fn ellipsis_start(&self, line: usize) -> usize;
    /// Number of bytes replaced by the ellipsis
    fn ellipsis_count(&self, line: usize) -> usize;

    /// True when line spacing was also added below the last line
    fn trailing_spacing_applied(&self) -> bool {
        false
    }

    /// Draw the layout, calling `f` with the rectangles it covers
    fn draw(&self, f: &mut dyn FnMut(i32, i32, u32, u32, Color));

    /// Swap the recorded bounds of `line` with the following line table row.
    ///
    /// Returns false when the line table cannot be modified.
    fn swap_line_bounds(&mut self, _line: usize) -> bool {
        false
    }
}

/// Engine that turns text, style and constraints into a [`Layout`]
pub trait ShapingBackend: Send + Sync {
    fn capabilities(&self) -> BackendCaps;

    fn font_metrics(&self, style: &TextStyle) -> FontMetrics;

    /// Width of the widest paragraph when laid out without wrapping
    fn measure_width(&self, text: &LayoutText, style: &TextStyle) -> f32;

    /// Metrics for the single line fast path, `None` when the text needs full layout
    fn boring_metrics(
        &self,
        text: &LayoutText,
        style: &TextStyle,
    ) -> Result<Option<BoringMetrics>, BackendError>;

    fn make_boring(
        &self,
        request: &LayoutRequest<'_>,
        boring: &BoringMetrics,
    ) -> Result<Box<dyn Layout>, BackendError>;

    fn make_layout(&self, request: &LayoutRequest<'_>) -> Result<Box<dyn Layout>, BackendError>;
}
