// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use std::sync::Arc;

use crate::saved::Saved;
use crate::{
    Alignment, BackendError, BreakStrategy, BuildParams, Color, ColorStateList, CompatShim,
    ConstructionPath, Ellipsize, GlyphWarmer, HyphenationFrequency, JustificationMode, Layout,
    LayoutCache, LayoutError, LayoutRequest, LayoutText, MeasureMode, Shadow, ShapingBackend,
    TextDirection, TextStyle, Typeface, TypefaceStyle, WidthBound,
};

/// Fluent builder producing [`Layout`]s.
///
/// Every setter that changes a value discards the layout saved by the last
/// [`build`](Self::build), setting a value it already has keeps it. Built layouts are shared
/// through a [`LayoutCache`] with every builder using the same cache.
///
/// ```
/// # #[cfg(feature = "monospace")]
/// # {
/// use std::sync::Arc;
/// use text_layout_builder::{MonospaceBackend, TextLayoutBuilder};
///
/// let mut builder = TextLayoutBuilder::new(Arc::new(MonospaceBackend::new()));
/// builder.set_text("Hello, world").unwrap().set_width(200).set_text_size(14.0);
/// let layout = builder.build().unwrap().unwrap();
/// assert_eq!(layout.line_count(), 1);
/// # }
/// ```
pub struct TextLayoutBuilder {
    params: BuildParams,
    shim: CompatShim,
    cache: Arc<LayoutCache>,
    saved: Saved<Arc<dyn Layout>>,
    glyph_warmer: Option<Arc<dyn GlyphWarmer>>,
    should_cache_layout: bool,
    should_warm_text: bool,
    /// The style allocation is referenced by a built layout
    style_shared: bool,
}

impl TextLayoutBuilder {
    /// Create a builder sharing layouts through [`LayoutCache::global`]
    pub fn new(backend: Arc<dyn ShapingBackend>) -> Self {
        Self::with_cache(backend, LayoutCache::global())
    }

    pub fn with_cache(backend: Arc<dyn ShapingBackend>, cache: Arc<LayoutCache>) -> Self {
        Self {
            params: BuildParams::default(),
            shim: CompatShim::new(backend),
            cache,
            saved: Saved::default(),
            glyph_warmer: None,
            should_cache_layout: true,
            should_warm_text: false,
            style_shared: false,
        }
    }

    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    pub fn style(&self) -> &Arc<TextStyle> {
        &self.params.style
    }

    pub fn cache(&self) -> &Arc<LayoutCache> {
        &self.cache
    }

    pub fn shim(&self) -> &CompatShim {
        &self.shim
    }

    fn invalidate(&mut self) {
        self.saved.invalidate();
    }

    /// Style for mutation, moved to a fresh allocation once a layout has been built with it
    fn style_mut(&mut self) -> &mut TextStyle {
        if self.style_shared {
            self.params.style = Arc::new(TextStyle::clone(&self.params.style));
            self.style_shared = false;
        }
        Arc::make_mut(&mut self.params.style)
    }

    /// Set the width, a width of zero or less measures the text instead
    pub fn set_width(&mut self, width: i32) -> &mut Self {
        let mode = if width <= 0 {
            MeasureMode::Unspecified
        } else {
            MeasureMode::Exactly
        };
        self.set_width_with_mode(width, mode)
    }

    pub fn set_width_with_mode(&mut self, width: i32, measure_mode: MeasureMode) -> &mut Self {
        if self.params.width != width || self.params.measure_mode != measure_mode {
            self.params.width = width;
            self.params.measure_mode = measure_mode;
            self.invalidate();
        }
        self
    }

    pub fn width(&self) -> i32 {
        self.params.width
    }

    pub fn measure_mode(&self) -> MeasureMode {
        self.params.measure_mode
    }

    /// Set the text to lay out.
    ///
    /// Text with a span missing its annotation is rejected, as laying it out would fail later.
    pub fn set_text<T: Into<LayoutText>>(&mut self, text: T) -> Result<&mut Self, LayoutError> {
        let text = text.into();
        text.validate()?;
        if self.params.text.as_ref() != Some(&text) {
            self.params.text = Some(text);
            self.invalidate();
        }
        Ok(self)
    }

    pub fn clear_text(&mut self) -> &mut Self {
        if self.params.text.take().is_some() {
            self.invalidate();
        }
        self
    }

    pub fn text(&self) -> Option<&LayoutText> {
        self.params.text.as_ref()
    }

    pub fn set_text_size(&mut self, size: f32) -> &mut Self {
        if self.params.style.text_size != size {
            self.style_mut().text_size = size;
            self.invalidate();
        }
        self
    }

    pub fn text_size(&self) -> f32 {
        self.params.style.text_size
    }

    /// Set a single text color, replacing any color state list
    pub fn set_text_color(&mut self, color: Color) -> &mut Self {
        if self.params.style.color != color || self.params.style.color_state.is_some() {
            let style = self.style_mut();
            style.color_state = None;
            style.color = color;
            self.invalidate();
        }
        self
    }

    /// Set a color state list, the text color becomes its default color
    pub fn set_text_color_state_list(&mut self, colors: Option<ColorStateList>) -> &mut Self {
        let color = colors
            .as_ref()
            .map_or(Color::BLACK, ColorStateList::default_color);
        if self.params.style.color_state != colors || self.params.style.color != color {
            let style = self.style_mut();
            style.color_state = colors;
            style.color = color;
            self.invalidate();
        }
        self
    }

    pub fn text_color(&self) -> Color {
        self.params.style.color
    }

    pub fn text_color_state_list(&self) -> Option<&ColorStateList> {
        self.params.style.color_state.as_ref()
    }

    pub fn set_link_color(&mut self, color: Color) -> &mut Self {
        if self.params.style.link_color != color {
            self.style_mut().link_color = color;
            self.invalidate();
        }
        self
    }

    pub fn link_color(&self) -> Color {
        self.params.style.link_color
    }

    /// Set extra space added to each line, ignored once a line height is set
    pub fn set_text_spacing_extra(&mut self, spacing_add: f32) -> &mut Self {
        if self.params.line_height.is_none() && self.params.spacing_add != spacing_add {
            self.params.spacing_add = spacing_add;
            self.invalidate();
        }
        self
    }

    pub fn text_spacing_extra(&self) -> f32 {
        self.params.spacing_add
    }

    /// Set the line spacing multiplier, ignored once a line height is set
    pub fn set_text_spacing_multiplier(&mut self, spacing_mult: f32) -> &mut Self {
        if self.params.line_height.is_none() && self.params.spacing_mult != spacing_mult {
            self.params.spacing_mult = spacing_mult;
            self.invalidate();
        }
        self
    }

    pub fn text_spacing_multiplier(&self) -> f32 {
        self.params.spacing_mult
    }

    /// Set an explicit line height, derived from the current font metrics
    pub fn set_line_height(&mut self, line_height: f32) -> &mut Self {
        if self.params.line_height != Some(line_height) {
            let metrics = self.shim.backend().font_metrics(&self.params.style);
            self.params.line_height = Some(line_height);
            self.params.spacing_add = line_height - metrics.line_spacing();
            self.params.spacing_mult = 1.0;
            self.invalidate();
        }
        self
    }

    /// Resolved line height in pixels
    pub fn line_height(&self) -> i32 {
        let metrics = self.shim.backend().font_metrics(&self.params.style);
        self.params.line_height(&metrics)
    }

    pub fn explicit_line_height(&self) -> Option<f32> {
        self.params.line_height
    }

    /// Set letter spacing in ems
    pub fn set_letter_spacing(&mut self, letter_spacing: f32) -> &mut Self {
        if self.params.style.letter_spacing != letter_spacing {
            self.style_mut().letter_spacing = letter_spacing;
            self.invalidate();
        }
        self
    }

    pub fn letter_spacing(&self) -> f32 {
        self.params.style.letter_spacing
    }

    pub fn set_include_font_padding(&mut self, include_padding: bool) -> &mut Self {
        if self.params.include_padding != include_padding {
            self.params.include_padding = include_padding;
            self.invalidate();
        }
        self
    }

    pub fn include_font_padding(&self) -> bool {
        self.params.include_padding
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        if self.params.alignment != alignment {
            self.params.alignment = alignment;
            self.invalidate();
        }
        self
    }

    pub fn alignment(&self) -> Alignment {
        self.params.alignment
    }

    pub fn set_text_direction(&mut self, direction: TextDirection) -> &mut Self {
        if self.params.text_direction != direction {
            self.params.text_direction = direction;
            self.invalidate();
        }
        self
    }

    pub fn text_direction(&self) -> TextDirection {
        self.params.text_direction
    }

    pub fn set_shadow_layer(&mut self, radius: f32, dx: f32, dy: f32, color: Color) -> &mut Self {
        let shadow = Shadow {
            radius,
            dx,
            dy,
            color,
        };
        if self.params.style.shadow != shadow {
            self.style_mut().shadow = shadow;
            self.invalidate();
        }
        self
    }

    pub fn shadow(&self) -> Shadow {
        self.params.style.shadow
    }

    /// Use the default typeface with the given style
    pub fn set_text_style(&mut self, style: TypefaceStyle) -> &mut Self {
        self.set_typeface(Some(Typeface::default_from_style(style)))
    }

    pub fn set_typeface(&mut self, typeface: Option<Typeface>) -> &mut Self {
        if self.params.style.typeface != typeface {
            self.style_mut().typeface = typeface;
            self.invalidate();
        }
        self
    }

    pub fn typeface(&self) -> Option<&Typeface> {
        self.params.style.typeface.as_ref()
    }

    /// Set the drawable state, resolving the text color again when it comes from a
    /// stateful color state list. A state matching no entry of the list selects its default
    /// color rather than transparent.
    pub fn set_drawable_state(&mut self, drawable_state: &[i32]) -> &mut Self {
        let color = match &self.params.style.color_state {
            Some(colors) if colors.is_stateful() => {
                colors.color_for_state(drawable_state, colors.default_color())
            }
            _ => self.params.style.color,
        };
        if self.params.style.drawable_state != drawable_state || self.params.style.color != color {
            let style = self.style_mut();
            style.drawable_state = drawable_state.to_vec();
            style.color = color;
            self.invalidate();
        }
        self
    }

    pub fn drawable_state(&self) -> &[i32] {
        &self.params.style.drawable_state
    }

    pub fn set_ellipsize(&mut self, ellipsize: Option<Ellipsize>) -> &mut Self {
        if self.params.ellipsize != ellipsize {
            self.params.ellipsize = ellipsize;
            self.invalidate();
        }
        self
    }

    pub fn ellipsize(&self) -> Option<Ellipsize> {
        self.params.ellipsize
    }

    pub fn set_use_line_spacing_from_fallbacks(&mut self, status: bool) -> &mut Self {
        if self.params.use_line_spacing_from_fallbacks != status {
            self.params.use_line_spacing_from_fallbacks = status;
            self.invalidate();
        }
        self
    }

    pub fn use_line_spacing_from_fallbacks(&self) -> bool {
        self.params.use_line_spacing_from_fallbacks
    }

    pub fn set_single_line(&mut self, single_line: bool) -> &mut Self {
        if self.params.single_line != single_line {
            self.params.single_line = single_line;
            self.invalidate();
        }
        self
    }

    pub fn single_line(&self) -> bool {
        self.params.single_line
    }

    pub fn set_max_lines(&mut self, max_lines: usize) -> &mut Self {
        if self.params.max_lines != max_lines {
            self.params.max_lines = max_lines;
            self.invalidate();
        }
        self
    }

    pub fn max_lines(&self) -> usize {
        self.params.max_lines
    }

    pub fn set_break_strategy(&mut self, break_strategy: BreakStrategy) -> &mut Self {
        if self.params.break_strategy != break_strategy {
            self.params.break_strategy = break_strategy;
            self.invalidate();
        }
        self
    }

    pub fn break_strategy(&self) -> BreakStrategy {
        self.params.break_strategy
    }

    pub fn set_hyphenation_frequency(&mut self, frequency: HyphenationFrequency) -> &mut Self {
        if self.params.hyphenation_frequency != frequency {
            self.params.hyphenation_frequency = frequency;
            self.invalidate();
        }
        self
    }

    pub fn hyphenation_frequency(&self) -> HyphenationFrequency {
        self.params.hyphenation_frequency
    }

    pub fn set_justification_mode(&mut self, mode: JustificationMode) -> &mut Self {
        if self.params.justification_mode != mode {
            self.params.justification_mode = mode;
            self.invalidate();
        }
        self
    }

    pub fn justification_mode(&self) -> JustificationMode {
        self.params.justification_mode
    }

    /// Set per-line indents in pixels, the last value applies to every following line
    pub fn set_indents(&mut self, left: Option<&[i32]>, right: Option<&[i32]>) -> &mut Self {
        if self.params.left_indents.as_deref() != left
            || self.params.right_indents.as_deref() != right
        {
            self.params.left_indents = left.map(Arc::from);
            self.params.right_indents = right.map(Arc::from);
            self.invalidate();
        }
        self
    }

    pub fn left_indents(&self) -> Option<&[i32]> {
        self.params.left_indents.as_deref()
    }

    pub fn right_indents(&self) -> Option<&[i32]> {
        self.params.right_indents.as_deref()
    }

    /// Whether built layouts are saved and shared through the cache
    pub fn set_should_cache_layout(&mut self, should_cache_layout: bool) -> &mut Self {
        self.should_cache_layout = should_cache_layout;
        self
    }

    pub fn should_cache_layout(&self) -> bool {
        self.should_cache_layout
    }

    /// Whether built layouts are passed to the glyph warmer
    pub fn set_should_warm_text(&mut self, should_warm_text: bool) -> &mut Self {
        self.should_warm_text = should_warm_text;
        self
    }

    pub fn should_warm_text(&self) -> bool {
        self.should_warm_text
    }

    pub fn set_glyph_warmer(&mut self, glyph_warmer: Option<Arc<dyn GlyphWarmer>>) -> &mut Self {
        self.glyph_warmer = glyph_warmer;
        self
    }

    pub fn glyph_warmer(&self) -> Option<&Arc<dyn GlyphWarmer>> {
        self.glyph_warmer.as_ref()
    }

    fn set_min_bound(&mut self, bound: WidthBound) -> &mut Self {
        if self.params.min_width != bound {
            self.params.min_width = bound;
            self.invalidate();
        }
        self
    }

    fn set_max_bound(&mut self, bound: WidthBound) -> &mut Self {
        if self.params.max_width != bound {
            self.params.max_width = bound;
            self.invalidate();
        }
        self
    }

    /// Set the minimum width in multiples of the line height
    pub fn set_min_ems(&mut self, min_ems: i32) -> &mut Self {
        self.set_min_bound(WidthBound::Ems(min_ems))
    }

    pub fn set_min_width(&mut self, min_width: i32) -> &mut Self {
        self.set_min_bound(WidthBound::Pixels(min_width))
    }

    /// Set the maximum width in multiples of the line height
    pub fn set_max_ems(&mut self, max_ems: i32) -> &mut Self {
        self.set_max_bound(WidthBound::Ems(max_ems))
    }

    pub fn set_max_width(&mut self, max_width: i32) -> &mut Self {
        self.set_max_bound(WidthBound::Pixels(max_width))
    }

    /// Minimum width in ems, `None` when the minimum is set in pixels
    pub fn min_ems(&self) -> Option<i32> {
        match self.params.min_width {
            WidthBound::Ems(ems) => Some(ems),
            WidthBound::Pixels(_) => None,
        }
    }

    /// Minimum width in pixels, `None` when the minimum is set in ems
    pub fn min_width(&self) -> Option<i32> {
        match self.params.min_width {
            WidthBound::Pixels(pixels) => Some(pixels),
            WidthBound::Ems(_) => None,
        }
    }

    pub fn max_ems(&self) -> Option<i32> {
        match self.params.max_width {
            WidthBound::Ems(ems) => Some(ems),
            WidthBound::Pixels(_) => None,
        }
    }

    pub fn max_width(&self) -> Option<i32> {
        match self.params.max_width {
            WidthBound::Pixels(pixels) => Some(pixels),
            WidthBound::Ems(_) => None,
        }
    }

    pub fn set_density(&mut self, density: f32) -> &mut Self {
        if self.params.style.density != density {
            self.style_mut().density = density;
            self.invalidate();
        }
        self
    }

    pub fn density(&self) -> f32 {
        self.params.style.density
    }

    /// Whether empty text produces a layout of one empty line instead of `None`
    pub fn set_should_layout_zero_length_text(&mut self, should_layout: bool) -> &mut Self {
        if self.params.should_layout_zero_length_text != should_layout {
            self.params.should_layout_zero_length_text = should_layout;
            if self.params.text.as_ref().map_or(true, LayoutText::is_empty) {
                self.invalidate();
            }
        }
        self
    }

    pub fn should_layout_zero_length_text(&self) -> bool {
        self.params.should_layout_zero_length_text
    }

    /// Build a layout from the current parameters.
    ///
    /// Returns `Ok(None)` when there is no text, or the text is empty and zero length
    /// layouts are not requested.
    pub fn build(&mut self) -> Result<Option<Arc<dyn Layout>>, LayoutError> {
        if self.should_cache_layout {
            if let Some(layout) = self.saved.get() {
                return Ok(Some(Arc::clone(layout)));
            }
        }

        let text = match &self.params.text {
            Some(text) if !text.is_empty() || self.params.should_layout_zero_length_text => {
                text.clone()
            }
            _ => return Ok(None),
        };

        // clickable spans are bound to their owner, such layouts are never shared
        let fingerprint = if self.should_cache_layout && !text.has_clickable() {
            Some(self.params.fingerprint())
        } else {
            None
        };

        if let Some(fingerprint) = fingerprint {
            if let Some(layout) = self.cache.get(fingerprint) {
                log::debug!("layout cache hit {:#010x}", fingerprint);
                self.saved.store(Arc::clone(&layout));
                return Ok(Some(layout));
            }
            log::debug!("layout cache miss {:#010x}", fingerprint);
        }

        let backend = Arc::clone(self.shim.backend());
        let max_lines = self.params.line_cap();

        let boring = if max_lines == 1 {
            match backend.boring_metrics(&text, &self.params.style) {
                Ok(boring) => boring,
                Err(err) => {
                    log::debug!("single line detection failed, using full layout: {}", err);
                    None
                }
            }
        } else {
            None
        };

        let metrics = backend.font_metrics(&self.params.style);
        let line_height = self.params.line_height(&metrics);
        let width = self.params.resolve_width(
            || backend.measure_width(&text, &self.params.style),
            line_height,
        );

        let layout = match boring {
            Some(boring) => {
                let request = layout_request(&self.params, &text, width, max_lines);
                self.shim.make_boring(&request, &boring)?
            }
            None => self.make_general(text, width, max_lines)?,
        };
        let layout: Arc<dyn Layout> = Arc::from(layout);

        if let Some(fingerprint) = fingerprint {
            self.saved.store(Arc::clone(&layout));
            self.cache.put(fingerprint, Arc::clone(&layout));
        }

        self.style_shared = true;

        if self.should_warm_text {
            if let Some(glyph_warmer) = &self.glyph_warmer {
                glyph_warmer.warm_layout(Arc::clone(&layout));
            }
        }

        Ok(Some(layout))
    }

    fn make_general(
        &mut self,
        mut text: LayoutText,
        width: i32,
        max_lines: usize,
    ) -> Result<Box<dyn Layout>, LayoutError> {
        loop {
            let request = layout_request(&self.params, &text, width, max_lines);
            match self.shim.make(&request) {
                Ok(layout) => return Ok(layout),
                Err(err @ BackendError::IndexOutOfBounds { .. }) if text.is_rich() => {
                    log::error!(
                        "layout of annotated text failed, retrying without annotations: {}",
                        err
                    );
                    text = text.to_plain();
                    self.params.text = Some(text.clone());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn layout_request<'a>(
    params: &'a BuildParams,
    text: &'a LayoutText,
    width: i32,
    max_lines: usize,
) -> LayoutRequest<'a> {
    LayoutRequest {
        path: ConstructionPath::Builder,
        text,
        range: 0..text.len(),
        style: &params.style,
        width,
        alignment: params.alignment,
        spacing_mult: params.spacing_mult,
        spacing_add: params.spacing_add,
        include_padding: params.include_padding,
        ellipsize: params.ellipsize,
        ellipsis_width: width,
        max_lines,
        direction: params.text_direction,
        break_strategy: params.break_strategy,
        hyphenation_frequency: params.hyphenation_frequency,
        justification_mode: params.justification_mode,
        left_indents: params.left_indents.as_deref(),
        right_indents: params.right_indents.as_deref(),
        use_line_spacing_from_fallbacks: params.use_line_spacing_from_fallbacks,
    }
}

impl fmt::Debug for TextLayoutBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLayoutBuilder")
            .field("params", &self.params)
            .field("shim", &self.shim)
            .field("saved", &self.saved.is_clean())
            .field("should_cache_layout", &self.should_cache_layout)
            .field("should_warm_text", &self.should_warm_text)
            .field("has_glyph_warmer", &self.glyph_warmer.is_some())
            .finish()
    }
}
