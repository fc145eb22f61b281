// SPDX-License-Identifier: MIT OR Apache-2.0

use core::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::{FontMetrics, LayoutError, LayoutText, TextStyle};

/// Default line cap, no limit
pub const DEFAULT_MAX_LINES: usize = usize::MAX;

const DEFAULT_SPACING_ADD: f32 = 0.0;
const DEFAULT_SPACING_MULT: f32 = 1.0;

/// How the configured width is interpreted, similar to a view measure spec
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MeasureMode {
    /// Lay out at the measured width of the content
    #[default]
    Unspecified,
    /// Lay out at exactly the configured width
    Exactly,
    /// Lay out at the measured width of the content, capped at the configured width
    AtMost,
}

impl TryFrom<i32> for MeasureMode {
    type Error = LayoutError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Exactly),
            2 => Ok(Self::AtMost),
            _ => Err(LayoutError::UnknownMeasureMode(raw)),
        }
    }
}

/// Paragraph alignment, relative to the paragraph direction
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Alignment {
    #[default]
    Normal,
    Opposite,
    Center,
}

/// Heuristic used to resolve the direction of each paragraph
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TextDirection {
    Ltr,
    Rtl,
    #[default]
    FirstStrongLtr,
    FirstStrongRtl,
    /// Right to left if any strong right to left character is present
    AnyRtlLtr,
    Locale,
}

/// Where truncated text is marked with an ellipsis
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Ellipsize {
    Start,
    Middle,
    End,
    /// Scrolling text; never ellipsized
    Marquee,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum BreakStrategy {
    #[default]
    Simple,
    HighQuality,
    Balanced,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HyphenationFrequency {
    #[default]
    None,
    Normal,
    Full,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum JustificationMode {
    #[default]
    None,
    InterWord,
}

/// A width bound expressed in pixels or in multiples of the resolved line height
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WidthBound {
    Pixels(i32),
    Ems(i32),
}

impl WidthBound {
    /// Resolve to pixels, ems are multiples of `line_height`
    pub fn to_pixels(self, line_height: i32) -> i32 {
        match self {
            Self::Pixels(pixels) => pixels,
            Self::Ems(ems) => ems.saturating_mul(line_height),
        }
    }
}

/// Every input that determines the shape of a layout
#[derive(Clone, Debug)]
pub struct BuildParams {
    pub text: Option<LayoutText>,
    pub style: Arc<TextStyle>,
    pub width: i32,
    pub measure_mode: MeasureMode,
    pub spacing_mult: f32,
    pub spacing_add: f32,
    /// Explicit line height; once set, spacing is derived from it
    pub line_height: Option<f32>,
    pub include_padding: bool,
    pub use_line_spacing_from_fallbacks: bool,
    pub should_layout_zero_length_text: bool,
    pub ellipsize: Option<Ellipsize>,
    pub single_line: bool,
    pub max_lines: usize,
    pub alignment: Alignment,
    pub text_direction: TextDirection,
    pub break_strategy: BreakStrategy,
    pub hyphenation_frequency: HyphenationFrequency,
    pub justification_mode: JustificationMode,
    pub left_indents: Option<Arc<[i32]>>,
    pub right_indents: Option<Arc<[i32]>>,
    pub min_width: WidthBound,
    pub max_width: WidthBound,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            text: None,
            style: Arc::new(TextStyle::new()),
            width: 0,
            measure_mode: MeasureMode::Unspecified,
            spacing_mult: DEFAULT_SPACING_MULT,
            spacing_add: DEFAULT_SPACING_ADD,
            line_height: None,
            include_padding: true,
            use_line_spacing_from_fallbacks: true,
            should_layout_zero_length_text: false,
            ellipsize: None,
            single_line: false,
            max_lines: DEFAULT_MAX_LINES,
            alignment: Alignment::Normal,
            text_direction: TextDirection::FirstStrongLtr,
            break_strategy: BreakStrategy::Simple,
            hyphenation_frequency: HyphenationFrequency::None,
            justification_mode: JustificationMode::None,
            left_indents: None,
            right_indents: None,
            min_width: WidthBound::Pixels(0),
            max_width: WidthBound::Pixels(i32::MAX),
        }
    }
}

impl BuildParams {
    /// Structural cache key. Collisions are possible and accepted.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        let hash = hasher.finish();
        (hash ^ (hash >> 32)) as u32
    }

    /// Effective line cap, a single line layout is capped at one
    pub fn line_cap(&self) -> usize {
        if self.single_line {
            1
        } else {
            self.max_lines
        }
    }

    /// Resolved line height for the given font metrics
    pub fn line_height(&self, metrics: &FontMetrics) -> i32 {
        (metrics.line_spacing_int() as f32 * self.spacing_mult + self.spacing_add).round() as i32
    }

    /// Resolve the layout width from the measure mode, then cap it above by the max bound and
    /// floor it below by the min bound.
    ///
    /// `measure` is only called when the mode needs the content width.
    pub fn resolve_width<F: FnOnce() -> f32>(&self, measure: F, line_height: i32) -> i32 {
        let width = match self.measure_mode {
            MeasureMode::Unspecified => measure().ceil() as i32,
            MeasureMode::Exactly => self.width,
            MeasureMode::AtMost => (measure().ceil() as i32).min(self.width),
        };
        width
            .min(self.max_width.to_pixels(line_height))
            .max(self.min_width.to_pixels(line_height))
    }
}

impl PartialEq for BuildParams {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.style == other.style
            && self.width == other.width
            && self.measure_mode == other.measure_mode
            && self.spacing_mult.to_bits() == other.spacing_mult.to_bits()
            && self.spacing_add.to_bits() == other.spacing_add.to_bits()
            && self.line_height.map(f32::to_bits) == other.line_height.map(f32::to_bits)
            && self.include_padding == other.include_padding
            && self.use_line_spacing_from_fallbacks == other.use_line_spacing_from_fallbacks
            && self.should_layout_zero_length_text == other.should_layout_zero_length_text
            && self.ellipsize == other.ellipsize
            && self.single_line == other.single_line
            && self.max_lines == other.max_lines
            && self.alignment == other.alignment
            && self.text_direction == other.text_direction
            && self.break_strategy == other.break_strategy
            && self.hyphenation_frequency == other.hyphenation_frequency
            && self.justification_mode == other.justification_mode
            && self.left_indents == other.left_indents
            && self.right_indents == other.right_indents
            && self.min_width == other.min_width
            && self.max_width == other.max_width
    }
}

impl Eq for BuildParams {}

impl Hash for BuildParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // style hashes by value, never by allocation
        self.style.as_ref().hash(state);
        self.width.hash(state);
        self.measure_mode.hash(state);
        self.spacing_mult.to_bits().hash(state);
        self.spacing_add.to_bits().hash(state);
        self.line_height.map(f32::to_bits).hash(state);
        self.include_padding.hash(state);
        self.use_line_spacing_from_fallbacks.hash(state);
        self.should_layout_zero_length_text.hash(state);
        self.ellipsize.hash(state);
        self.single_line.hash(state);
        self.max_lines.hash(state);
        self.alignment.hash(state);
        self.text_direction.hash(state);
        self.break_strategy.hash(state);
        self.hyphenation_frequency.hash(state);
        self.justification_mode.hash(state);
        self.left_indents.hash(state);
        self.right_indents.hash(state);
        self.min_width.hash(state);
        self.max_width.hash(state);
        self.text.hash(state);
    }
}
