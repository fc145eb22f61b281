#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use text_layout_builder::{
    Alignment, BackendCaps, BackendError, BoringMetrics, Color, ConstructionPath, FontMetrics,
    GlyphWarmer, JustificationMode, Layout, LayoutCache, LayoutRequest, LayoutText,
    MonospaceBackend, MonospaceOptions, ShapingBackend, TextLayoutBuilder, TextStyle,
};

pub const TEST: &str = "TEST";

pub const LONG_TEXT: &str = "Lorem ipsum dolor sit amet test \n\
                             Lorem ipsum dolor sit amet test \n\
                             Lorem ipsum dolor sit amet test \n\
                             Lorem ipsum dolor sit amet test \n";

/// A builder over a fresh cache, so tests never observe each other's layouts
pub fn builder_with(backend: Arc<dyn ShapingBackend>) -> (TextLayoutBuilder, Arc<LayoutCache>) {
    let cache = Arc::new(LayoutCache::default());
    let builder = TextLayoutBuilder::with_cache(backend, Arc::clone(&cache));
    (builder, cache)
}

pub fn builder() -> (TextLayoutBuilder, Arc<LayoutCache>) {
    builder_with(Arc::new(MonospaceBackend::new()))
}

/// Backend with an ascent of 0 and a descent of 10 for every style
pub fn fixed_metrics_backend(trailing_line_spacing: bool) -> MonospaceBackend {
    MonospaceBackend::with_options(MonospaceOptions {
        fixed_metrics: Some(FontMetrics::new(0.0, 10.0)),
        trailing_line_spacing,
        ..Default::default()
    })
}

pub fn line_texts(layout: &dyn Layout) -> Vec<String> {
    (0..layout.line_count())
        .map(|line| {
            layout.text().as_str()[layout.line_start(line)..layout.line_end(line)].to_string()
        })
        .collect()
}

/// Faults injected by a [`FaultyBackend`]
#[derive(Clone, Debug, Default)]
pub struct Faults {
    /// Capabilities to report instead of the real ones
    pub caps: Option<BackendCaps>,
    /// Number of construction calls failing with a transient race
    pub races: usize,
    /// Fail construction of annotated text with an index fault
    pub index_fault_on_rich: bool,
    /// Fail every construction with an index fault
    pub index_fault_always: bool,
    /// Swap the line table rows of this line after construction
    pub corrupt_line: Option<usize>,
    /// Produce layouts whose line table cannot be modified
    pub rigid: bool,
    pub boring_fails: bool,
    /// Report the capped constructor as missing when it is called
    pub capped_unsupported: bool,
}

/// Parameters of one construction call
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub path: ConstructionPath,
    pub text: String,
    pub max_lines: usize,
    pub justification_mode: JustificationMode,
    pub use_line_spacing_from_fallbacks: bool,
}

/// [`MonospaceBackend`] wrapper misbehaving on demand and recording every call
pub struct FaultyBackend {
    inner: MonospaceBackend,
    faults: Faults,
    races_left: AtomicUsize,
    boring_calls: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl FaultyBackend {
    pub fn new(faults: Faults) -> Self {
        Self::with_inner(MonospaceBackend::new(), faults)
    }

    pub fn with_inner(inner: MonospaceBackend, faults: Faults) -> Self {
        Self {
            inner,
            races_left: AtomicUsize::new(faults.races),
            faults,
            boring_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn paths(&self) -> Vec<ConstructionPath> {
        self.calls.lock().iter().map(|call| call.path).collect()
    }

    pub fn boring_calls(&self) -> usize {
        self.boring_calls.load(Ordering::SeqCst)
    }

    fn finish(&self, mut layout: Box<dyn Layout>) -> Box<dyn Layout> {
        if let Some(line) = self.faults.corrupt_line {
            layout.swap_line_bounds(line);
        }
        if self.faults.rigid {
            return Box::new(Probe::new(layout));
        }
        layout
    }
}

impl ShapingBackend for FaultyBackend {
    fn capabilities(&self) -> BackendCaps {
        self.faults.caps.unwrap_or_else(|| self.inner.capabilities())
    }

    fn font_metrics(&self, style: &TextStyle) -> FontMetrics {
        self.inner.font_metrics(style)
    }

    fn measure_width(&self, text: &LayoutText, style: &TextStyle) -> f32 {
        self.inner.measure_width(text, style)
    }

    fn boring_metrics(
        &self,
        text: &LayoutText,
        style: &TextStyle,
    ) -> Result<Option<BoringMetrics>, BackendError> {
        self.boring_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.boring_fails {
            return Err(BackendError::Other("font metrics unavailable".into()));
        }
        self.inner.boring_metrics(text, style)
    }

    fn make_boring(
        &self,
        request: &LayoutRequest<'_>,
        boring: &BoringMetrics,
    ) -> Result<Box<dyn Layout>, BackendError> {
        self.inner.make_boring(request, boring)
    }

    fn make_layout(&self, request: &LayoutRequest<'_>) -> Result<Box<dyn Layout>, BackendError> {
        self.calls.lock().push(Call {
            path: request.path,
            text: request.text.as_str()[request.range.clone()].to_string(),
            max_lines: request.max_lines,
            justification_mode: request.justification_mode,
            use_line_spacing_from_fallbacks: request.use_line_spacing_from_fallbacks,
        });

        if self.faults.capped_unsupported && request.path == ConstructionPath::Capped {
            return Err(BackendError::Unsupported);
        }
        let raced = self
            .races_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if raced {
            return Err(BackendError::TransientRace("utext_close".into()));
        }
        if self.faults.index_fault_always
            || (self.faults.index_fault_on_rich && request.text.is_rich())
        {
            return Err(BackendError::IndexOutOfBounds {
                index: request.range.end,
                len: request.range.end - 1,
            });
        }

        self.inner.make_layout(request).map(|layout| self.finish(layout))
    }
}

/// Layout forwarding to another one, with a line table that cannot be modified and an
/// optional hook run on every draw
pub struct Probe {
    inner: Box<dyn Layout>,
    on_draw: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Probe {
    pub fn new(inner: Box<dyn Layout>) -> Self {
        Self {
            inner,
            on_draw: None,
        }
    }

    pub fn on_draw<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_draw = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Probe").field(&self.inner).finish()
    }
}

impl Layout for Probe {
    fn text(&self) -> &LayoutText {
        self.inner.text()
    }

    fn style(&self) -> &Arc<TextStyle> {
        self.inner.style()
    }

    fn width(&self) -> i32 {
        self.inner.width()
    }

    fn height(&self) -> i32 {
        self.inner.height()
    }

    fn alignment(&self) -> Alignment {
        self.inner.alignment()
    }

    fn spacing_multiplier(&self) -> f32 {
        self.inner.spacing_multiplier()
    }

    fn spacing_add(&self) -> f32 {
        self.inner.spacing_add()
    }

    fn line_count(&self) -> usize {
        self.inner.line_count()
    }

    fn line_start(&self, line: usize) -> usize {
        self.inner.line_start(line)
    }

    fn line_end(&self, line: usize) -> usize {
        self.inner.line_end(line)
    }

    fn line_top(&self, line: usize) -> i32 {
        self.inner.line_top(line)
    }

    fn line_bottom(&self, line: usize) -> i32 {
        self.inner.line_bottom(line)
    }

    fn line_ascent(&self, line: usize) -> i32 {
        self.inner.line_ascent(line)
    }

    fn line_descent(&self, line: usize) -> i32 {
        self.inner.line_descent(line)
    }

    fn line_left(&self, line: usize) -> f32 {
        self.inner.line_left(line)
    }

    fn line_right(&self, line: usize) -> f32 {
        self.inner.line_right(line)
    }

    fn is_rtl(&self, line: usize) -> bool {
        self.inner.is_rtl(line)
    }

    fn ellipsis_start(&self, line: usize) -> usize {
        self.inner.ellipsis_start(line)
    }

    fn ellipsis_count(&self, line: usize) -> usize {
        self.inner.ellipsis_count(line)
    }

    fn trailing_spacing_applied(&self) -> bool {
        self.inner.trailing_spacing_applied()
    }

    fn draw(&self, f: &mut dyn FnMut(i32, i32, u32, u32, Color)) {
        if let Some(on_draw) = &self.on_draw {
            on_draw();
        }
        self.inner.draw(f);
    }
}

/// Layout of `text` from the reference backend
pub fn plain_layout(text: &str) -> Box<dyn Layout> {
    let text = LayoutText::from(text);
    let style = Arc::new(TextStyle::new());
    let request = LayoutRequest {
        path: ConstructionPath::Builder,
        text: &text,
        range: 0..text.len(),
        style: &style,
        width: 1000,
        alignment: Alignment::Normal,
        spacing_mult: 1.0,
        spacing_add: 0.0,
        include_padding: true,
        ellipsize: None,
        ellipsis_width: 1000,
        max_lines: usize::MAX,
        direction: Default::default(),
        break_strategy: Default::default(),
        hyphenation_frequency: Default::default(),
        justification_mode: JustificationMode::None,
        left_indents: None,
        right_indents: None,
        use_line_spacing_from_fallbacks: true,
    };
    MonospaceBackend::new().make_layout(&request).unwrap()
}

/// Glyph warmer keeping every layout it is given
#[derive(Default)]
pub struct RecordingWarmer {
    layouts: Mutex<Vec<Arc<dyn Layout>>>,
}

impl RecordingWarmer {
    pub fn layouts(&self) -> Vec<Arc<dyn Layout>> {
        self.layouts.lock().clone()
    }
}

impl GlyphWarmer for RecordingWarmer {
    fn warm_layout(&self, layout: Arc<dyn Layout>) {
        self.layouts.lock().push(layout);
    }
}
