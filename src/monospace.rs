// SPDX-License-Identifier: MIT OR Apache-2.0

//! A deterministic backend placing every grapheme at a fixed advance.
//!
//! Break opportunities come from `unicode-linebreak`, grapheme boundaries from
//! `unicode-segmentation` and directionality from `unicode-bidi`. Lines are filled greedily.

use std::sync::Arc;

use unicode_bidi::{bidi_class, BidiClass};
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Alignment, BackendCaps, BackendError, BoringMetrics, Color, ConstructionPath, Ellipsize,
    FontMetrics, JustificationMode, Layout, LayoutRequest, LayoutText, ShapingBackend,
    TextDirection, TextStyle,
};

/// Settings of a [`MonospaceBackend`]
#[derive(Clone, Debug)]
pub struct MonospaceOptions {
    /// Advance of one grapheme as a fraction of the text size
    pub advance_ratio: f32,
    /// Metrics used for every style instead of ones derived from the text size
    pub fixed_metrics: Option<FontMetrics>,
    /// Also add line spacing below the last line
    pub trailing_line_spacing: bool,
    pub caps: BackendCaps,
}

impl Default for MonospaceOptions {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            fixed_metrics: None,
            trailing_line_spacing: false,
            caps: BackendCaps::all(),
        }
    }
}

/// Fixed advance [`ShapingBackend`]
#[derive(Clone, Debug, Default)]
pub struct MonospaceBackend {
    options: MonospaceOptions,
}

impl MonospaceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MonospaceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MonospaceOptions {
        &self.options
    }

    /// Horizontal advance of one grapheme
    pub fn advance(&self, style: &TextStyle) -> f32 {
        style.text_size * self.options.advance_ratio + style.letter_spacing * style.text_size
    }

    fn layout_lines(
        &self,
        request: &LayoutRequest<'_>,
        metrics: FontMetrics,
        lines: Vec<RawLine>,
        end: usize,
    ) -> MonospaceLayout {
        let advance = self.advance(request.style);
        let count = lines.len();

        let ascent = metrics.ascent.floor() as i32;
        let descent = metrics.descent.ceil() as i32;
        let leading = metrics.leading.round() as i32;
        let natural = descent - ascent + leading;
        let extra = if request.spacing_mult != 1.0 || request.spacing_add != 0.0 {
            (natural as f32 * request.spacing_mult + request.spacing_add).round() as i32 - natural
        } else {
            0
        };

        let mut rows = Vec::with_capacity(count + 1);
        let mut top = 0;
        for (i, line) in lines.iter().enumerate() {
            let last = i + 1 == count;
            let mut line_ascent = ascent;
            let mut line_descent = descent + leading;
            if request.include_padding {
                if i == 0 {
                    line_ascent = metrics.top.floor() as i32;
                }
                if last {
                    line_descent = metrics.bottom.ceil() as i32 + leading;
                }
            }
            if !last || self.options.trailing_line_spacing {
                line_descent += extra;
            }

            let (left_indent, right_indent) = indents(request, i);
            let available = request
                .width
                .saturating_sub(left_indent)
                .saturating_sub(right_indent) as f32;
            let width = line.visible as f32 * advance;
            let justify = request.justification_mode == JustificationMode::InterWord
                && !line.paragraph_end
                && line.ellipsis.is_none();
            let (left, right) = if justify {
                (left_indent as f32, left_indent as f32 + available)
            } else {
                match (request.alignment, line.rtl) {
                    (Alignment::Normal, false) | (Alignment::Opposite, true) => {
                        (left_indent as f32, left_indent as f32 + width)
                    }
                    (Alignment::Normal, true) | (Alignment::Opposite, false) => {
                        let right = request.width.saturating_sub(right_indent) as f32;
                        (right - width, right)
                    }
                    (Alignment::Center, _) => {
                        let left = left_indent as f32 + ((available - width) / 2.0).floor();
                        (left, left + width)
                    }
                }
            };

            let (ellipsis_start, ellipsis_count) = line.ellipsis.unwrap_or_default();
            rows.push(LineRow {
                start: line.start,
                top,
                ascent: line_ascent,
                descent: line_descent,
                left,
                right,
                rtl: line.rtl,
                ellipsis_start,
                ellipsis_count,
            });
            top += line_descent - line_ascent;
        }
        rows.push(LineRow {
            start: end,
            top,
            ..LineRow::default()
        });

        MonospaceLayout {
            text: request.text.clone(),
            style: Arc::clone(request.style),
            width: request.width,
            alignment: request.alignment,
            spacing_mult: request.spacing_mult,
            spacing_add: request.spacing_add,
            trailing_spacing: self.options.trailing_line_spacing && extra != 0,
            rows,
        }
    }

    /// Number of graphemes that fit in `width`, at least one
    fn graphemes_in(&self, style: &TextStyle, width: f32) -> usize {
        let advance = self.advance(style);
        if advance <= 0.0 {
            return usize::MAX;
        }
        ((width + 0.001) / advance).floor().max(1.0) as usize
    }
}

impl ShapingBackend for MonospaceBackend {
    fn capabilities(&self) -> BackendCaps {
        self.options.caps
    }

    fn font_metrics(&self, style: &TextStyle) -> FontMetrics {
        if let Some(metrics) = self.options.fixed_metrics {
            return metrics;
        }
        let size = style.text_size;
        FontMetrics {
            top: -0.95 * size,
            ascent: -0.8 * size,
            descent: 0.2 * size,
            bottom: 0.25 * size,
            leading: 0.0,
        }
    }

    fn measure_width(&self, text: &LayoutText, style: &TextStyle) -> f32 {
        let widest = text
            .as_str()
            .split('\n')
            .map(|paragraph| paragraph.graphemes(true).count())
            .max()
            .unwrap_or(0);
        widest as f32 * self.advance(style)
    }

    fn boring_metrics(
        &self,
        text: &LayoutText,
        style: &TextStyle,
    ) -> Result<Option<BoringMetrics>, BackendError> {
        let boring = text.as_str().chars().all(|c| {
            !matches!(c, '\n' | '\t')
                && !matches!(bidi_class(c), BidiClass::R | BidiClass::AL | BidiClass::AN)
                && matches!(
                    c.script(),
                    Script::Common | Script::Inherited | Script::Latin | Script::Unknown
                )
        });
        if !boring {
            return Ok(None);
        }
        Ok(Some(BoringMetrics {
            width: text.as_str().graphemes(true).count() as f32 * self.advance(style),
            metrics: self.font_metrics(style),
        }))
    }

    fn make_boring(
        &self,
        request: &LayoutRequest<'_>,
        boring: &BoringMetrics,
    ) -> Result<Box<dyn Layout>, BackendError> {
        let content = checked_range(request)?;
        let start = request.range.start;
        let mut line = RawLine {
            start,
            end: request.range.end,
            visible: content.graphemes(true).count(),
            rtl: false,
            paragraph_end: true,
            ellipsis: None,
        };
        if let Some(mode) = request.ellipsize.filter(|mode| *mode != Ellipsize::Marquee) {
            if boring.width > request.ellipsis_width as f32 {
                let fit = self.graphemes_in(request.style, request.ellipsis_width as f32);
                let elided = elide(content, mode, fit);
                line.visible = elided.visible;
                line.ellipsis = Some((elided.start, elided.end - elided.start));
            }
        }
        let end = line.end;
        Ok(Box::new(self.layout_lines(
            request,
            boring.metrics,
            vec![line],
            end,
        )))
    }

    fn make_layout(&self, request: &LayoutRequest<'_>) -> Result<Box<dyn Layout>, BackendError> {
        let content = checked_range(request)?;
        let base = request.range.start;
        let cap = match request.path {
            ConstructionPath::Baseline => usize::MAX,
            _ => request.max_lines.max(1),
        };
        let advance = self.advance(request.style);

        let mut lines = Vec::new();
        let mut offset = 0;
        let mut paragraphs: Vec<&str> = content.split_inclusive('\n').collect();
        if content.is_empty() || content.ends_with('\n') {
            paragraphs.push("");
        }
        for paragraph in paragraphs {
            let body = paragraph.strip_suffix('\n').unwrap_or(paragraph);
            let rtl = paragraph_rtl(body, request.direction);
            let first = lines.len();
            break_paragraph(body, advance, |line| line_width(request, first + line), &mut lines);
            for line in &mut lines[first..] {
                line.start += base + offset;
                line.end += base + offset;
                line.rtl = rtl;
            }
            if let Some(last) = lines.last_mut() {
                last.end = base + offset + paragraph.len();
                last.paragraph_end = true;
            }
            offset += paragraph.len();
            if lines.len() > cap {
                break;
            }
        }

        let mut end = request.range.end;
        if lines.len() > cap {
            lines.truncate(cap);
            let last = cap - 1;
            let line_start = lines[last].start;
            match request.ellipsize.filter(|mode| *mode != Ellipsize::Marquee) {
                Some(mode) => {
                    let rest = &request.text.as_str()[line_start..request.range.end];
                    let fit = self.graphemes_in(
                        request.style,
                        line_width(request, last).min(request.ellipsis_width as f32),
                    );
                    let (elided, region) = if cap == 1 && !rest.contains('\n') {
                        let elided = elide(rest, mode, fit);
                        (elided, elided.end - elided.start)
                    } else {
                        let natural = &request.text.as_str()[line_start..lines[last].end];
                        let natural = natural.trim_end_matches(char::is_whitespace);
                        let elided = elide(natural, Ellipsize::End, fit);
                        (elided, rest.len() - elided.start)
                    };
                    let line = &mut lines[last];
                    line.visible = elided.visible;
                    line.ellipsis = Some((elided.start, region));
                    line.end = request.range.end;
                }
                None => end = lines[last].end,
            }
        } else if let Some(last) = lines.last() {
            end = last.end;
        }

        Ok(Box::new(self.layout_lines(
            request,
            self.font_metrics(request.style),
            lines,
            end,
        )))
    }
}

#[derive(Clone, Copy, Debug)]
struct RawLine {
    start: usize,
    end: usize,
    visible: usize,
    rtl: bool,
    paragraph_end: bool,
    /// Ellipsis start relative to the line start, and count
    ellipsis: Option<(usize, usize)>,
}

impl RawLine {
    fn new(start: usize, end: usize, visible: usize) -> Self {
        Self {
            start,
            end,
            visible,
            rtl: false,
            paragraph_end: false,
            ellipsis: None,
        }
    }
}

fn checked_range<'a>(request: &LayoutRequest<'a>) -> Result<&'a str, BackendError> {
    let text = request.text.as_str();
    text.get(request.range.clone())
        .ok_or(BackendError::IndexOutOfBounds {
            index: request.range.end,
            len: text.len(),
        })
}

fn indents(request: &LayoutRequest<'_>, line: usize) -> (i32, i32) {
    let pick = |indents: Option<&[i32]>| {
        indents
            .and_then(|indents| indents.get(line).or(indents.last()))
            .copied()
            .unwrap_or(0)
    };
    (pick(request.left_indents), pick(request.right_indents))
}

fn line_width(request: &LayoutRequest<'_>, line: usize) -> f32 {
    let (left, right) = indents(request, line);
    request.width.saturating_sub(left).saturating_sub(right).max(0) as f32
}

fn paragraph_rtl(text: &str, direction: TextDirection) -> bool {
    let strong = || {
        text.chars().find_map(|c| match bidi_class(c) {
            BidiClass::L => Some(false),
            BidiClass::R | BidiClass::AL => Some(true),
            _ => None,
        })
    };
    match direction {
        TextDirection::Ltr | TextDirection::Locale => false,
        TextDirection::Rtl => true,
        TextDirection::FirstStrongLtr => strong().unwrap_or(false),
        TextDirection::FirstStrongRtl => strong().unwrap_or(true),
        TextDirection::AnyRtlLtr => text
            .chars()
            .any(|c| matches!(bidi_class(c), BidiClass::R | BidiClass::AL)),
    }
}

/// Greedily fill lines of one paragraph. Trailing whitespace hangs past the line width,
/// words wider than a line are broken between graphemes.
fn break_paragraph<W: Fn(usize) -> f32>(
    text: &str,
    advance: f32,
    width_of: W,
    lines: &mut Vec<RawLine>,
) {
    let first = lines.len();
    let fits = |graphemes: usize, line: usize| {
        graphemes as f32 * advance <= width_of(line) + 0.001
    };

    let mut line_start = 0;
    let mut visible = 0;
    let mut hanging = 0;
    let mut segment_start = 0;
    if !text.is_empty() {
        for (segment_end, _) in unicode_linebreak::linebreaks(text) {
            let segment = &text[segment_start..segment_end];
            let word = segment.trim_end_matches(char::is_whitespace);
            let word_graphemes = word.graphemes(true).count();
            let space_graphemes = segment[word.len()..].graphemes(true).count();

            if word_graphemes > 0 {
                let line = lines.len() - first;
                if visible > 0 && !fits(visible + hanging + word_graphemes, line) {
                    lines.push(RawLine::new(line_start, segment_start, visible));
                    line_start = segment_start;
                    visible = 0;
                    hanging = 0;
                }

                let line = lines.len() - first;
                if fits(visible + hanging + word_graphemes, line) {
                    visible += hanging + word_graphemes;
                } else {
                    for (i, _) in word.grapheme_indices(true) {
                        let line = lines.len() - first;
                        if visible + hanging > 0 && !fits(visible + hanging + 1, line) {
                            let at = segment_start + i;
                            lines.push(RawLine::new(line_start, at, visible));
                            line_start = at;
                            visible = 0;
                            hanging = 0;
                        }
                        visible += hanging + 1;
                        hanging = 0;
                    }
                }
                hanging = space_graphemes;
            } else {
                hanging += space_graphemes;
            }
            segment_start = segment_end;
        }
    }
    lines.push(RawLine::new(line_start, text.len(), visible));
}

#[derive(Clone, Copy, Debug)]
struct Elided {
    start: usize,
    end: usize,
    visible: usize,
}

/// Replace part of `text` with an ellipsis so that at most `fit` graphemes remain,
/// counting the ellipsis. `start..end` is the replaced byte range.
fn elide(text: &str, mode: Ellipsize, fit: usize) -> Elided {
    let offsets: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    let total = offsets.len();
    let at = |grapheme: usize| offsets.get(grapheme).copied().unwrap_or(text.len());
    let keep = fit.saturating_sub(1).min(total);
    match mode {
        Ellipsize::Start => Elided {
            start: 0,
            end: at(total - keep),
            visible: keep + 1,
        },
        Ellipsize::Middle => {
            let head = (keep + 1) / 2;
            let tail = keep - head;
            Elided {
                start: at(head),
                end: at(total - tail),
                visible: keep + 1,
            }
        }
        Ellipsize::End | Ellipsize::Marquee => Elided {
            start: at(keep),
            end: text.len(),
            visible: keep + 1,
        },
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct LineRow {
    start: usize,
    top: i32,
    ascent: i32,
    descent: i32,
    left: f32,
    right: f32,
    rtl: bool,
    ellipsis_start: usize,
    ellipsis_count: usize,
}

/// Layout produced by [`MonospaceBackend`]. The line table holds one row per line plus a
/// final row recording the end offset and total height.
#[derive(Clone, Debug)]
pub struct MonospaceLayout {
    text: LayoutText,
    style: Arc<TextStyle>,
    width: i32,
    alignment: Alignment,
    spacing_mult: f32,
    spacing_add: f32,
    trailing_spacing: bool,
    rows: Vec<LineRow>,
}

impl Layout for MonospaceLayout {
    fn text(&self) -> &LayoutText {
        &self.text
    }

    fn style(&self) -> &Arc<TextStyle> {
        &self.style
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.rows.last().map_or(0, |row| row.top)
    }

    fn alignment(&self) -> Alignment {
        self.alignment
    }

    fn spacing_multiplier(&self) -> f32 {
        self.spacing_mult
    }

    fn spacing_add(&self) -> f32 {
        self.spacing_add
    }

    fn line_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    fn line_start(&self, line: usize) -> usize {
        self.rows[line].start
    }

    fn line_end(&self, line: usize) -> usize {
        self.rows[line + 1].start
    }

    fn line_top(&self, line: usize) -> i32 {
        self.rows[line].top
    }

    fn line_bottom(&self, line: usize) -> i32 {
        self.rows[line + 1].top
    }

    fn line_ascent(&self, line: usize) -> i32 {
        self.rows[line].ascent
    }

    fn line_descent(&self, line: usize) -> i32 {
        self.rows[line].descent
    }

    fn line_left(&self, line: usize) -> f32 {
        self.rows[line].left
    }

    fn line_right(&self, line: usize) -> f32 {
        self.rows[line].right
    }

    fn is_rtl(&self, line: usize) -> bool {
        self.rows[line].rtl
    }

    fn ellipsis_start(&self, line: usize) -> usize {
        self.rows[line].ellipsis_start
    }

    fn ellipsis_count(&self, line: usize) -> usize {
        self.rows[line].ellipsis_count
    }

    fn trailing_spacing_applied(&self) -> bool {
        self.trailing_spacing
    }

    fn draw(&self, f: &mut dyn FnMut(i32, i32, u32, u32, Color)) {
        let shadow = self.style.shadow;
        for line in 0..self.line_count() {
            let x = self.line_left(line).floor() as i32;
            let y = self.line_top(line);
            let w = (self.line_right(line) - self.line_left(line)).max(0.0).ceil() as u32;
            let h = (self.line_bottom(line) - y).max(0) as u32;
            if shadow.radius > 0.0 && shadow.color.a() > 0 {
                f(
                    x.saturating_add(shadow.dx.round() as i32),
                    y.saturating_add(shadow.dy.round() as i32),
                    w,
                    h,
                    shadow.color,
                );
            }
            f(x, y, w, h, self.style.color);
        }
    }

    fn swap_line_bounds(&mut self, line: usize) -> bool {
        if line + 1 >= self.rows.len() {
            return false;
        }
        self.rows.swap(line, line + 1);
        true
    }
}
