// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction of layouts across backends with differing capabilities.
//!
//! A [`CompatShim`] picks one [`LayoutStrategy`] when it is created and then papers over
//! backend defects on every construction: transient races are retried once, line caps
//! the strategy cannot pass are enforced by truncating the text, and line tables with
//! inverted bounds are repaired in place.

use core::fmt;
use core::ops::Range;
use std::sync::Arc;

use crate::{
    BackendCaps, BackendError, BoringMetrics, BreakStrategy, ConstructionPath,
    HyphenationFrequency, JustificationMode, Layout, LayoutRequest, LayoutText, ShapingBackend,
    TextDirection,
};

const SPACE_AND_ELLIPSIS: &str = " \u{2026}";

/// One way of turning a [`LayoutRequest`] into a backend call
pub trait LayoutStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether layouts built by this strategy never exceed the requested line cap
    fn enforces_max_lines(&self) -> bool;

    fn build(
        &self,
        backend: &dyn ShapingBackend,
        request: &LayoutRequest<'_>,
    ) -> Result<Box<dyn Layout>, BackendError>;
}

/// Full builder, passing every parameter the backend understands
#[derive(Debug)]
pub struct BuilderStrategy {
    caps: BackendCaps,
}

impl BuilderStrategy {
    pub fn new(caps: BackendCaps) -> Self {
        Self { caps }
    }
}

impl LayoutStrategy for BuilderStrategy {
    fn name(&self) -> &'static str {
        "builder"
    }

    fn enforces_max_lines(&self) -> bool {
        true
    }

    fn build(
        &self,
        backend: &dyn ShapingBackend,
        request: &LayoutRequest<'_>,
    ) -> Result<Box<dyn Layout>, BackendError> {
        let mut request = request.clone();
        request.path = ConstructionPath::Builder;
        if !self.caps.contains(BackendCaps::JUSTIFICATION) {
            request.justification_mode = JustificationMode::None;
        }
        if !self.caps.contains(BackendCaps::FALLBACK_LINE_SPACING) {
            request.use_line_spacing_from_fallbacks = false;
        }
        backend.make_layout(&request)
    }
}

/// Constructor taking a line cap and a direction, falling back to [`BaselineStrategy`]
/// when the backend turns out not to provide it
#[derive(Debug, Default)]
pub struct CappedStrategy;

impl LayoutStrategy for CappedStrategy {
    fn name(&self) -> &'static str {
        "capped"
    }

    fn enforces_max_lines(&self) -> bool {
        // the fallback ignores the cap
        false
    }

    fn build(
        &self,
        backend: &dyn ShapingBackend,
        request: &LayoutRequest<'_>,
    ) -> Result<Box<dyn Layout>, BackendError> {
        let mut capped = request.clone();
        capped.path = ConstructionPath::Capped;
        capped.break_strategy = BreakStrategy::Simple;
        capped.hyphenation_frequency = HyphenationFrequency::None;
        capped.justification_mode = JustificationMode::None;
        capped.left_indents = None;
        capped.right_indents = None;
        capped.use_line_spacing_from_fallbacks = false;
        match backend.make_layout(&capped) {
            Err(BackendError::Unsupported) => {
                log::debug!("capped constructor unavailable, using baseline constructor");
                BaselineStrategy.build(backend, request)
            }
            result => result,
        }
    }
}

/// Public constructor without a line cap or direction
#[derive(Debug, Default)]
pub struct BaselineStrategy;

impl LayoutStrategy for BaselineStrategy {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn enforces_max_lines(&self) -> bool {
        false
    }

    fn build(
        &self,
        backend: &dyn ShapingBackend,
        request: &LayoutRequest<'_>,
    ) -> Result<Box<dyn Layout>, BackendError> {
        let request = LayoutRequest {
            path: ConstructionPath::Baseline,
            max_lines: usize::MAX,
            direction: TextDirection::default(),
            break_strategy: BreakStrategy::Simple,
            hyphenation_frequency: HyphenationFrequency::None,
            justification_mode: JustificationMode::None,
            left_indents: None,
            right_indents: None,
            use_line_spacing_from_fallbacks: false,
            ..request.clone()
        };
        backend.make_layout(&request)
    }
}

/// Pick the most capable strategy a backend supports
pub fn select_strategy(caps: BackendCaps) -> Box<dyn LayoutStrategy> {
    if caps.contains(BackendCaps::MAX_LINES_BUILDER) {
        Box::new(BuilderStrategy::new(caps))
    } else if caps.contains(BackendCaps::CAPPED_CONSTRUCTOR) {
        Box::new(CappedStrategy)
    } else {
        Box::new(BaselineStrategy)
    }
}

/// Backend wrapper applying the selected [`LayoutStrategy`] and its corrections
pub struct CompatShim {
    backend: Arc<dyn ShapingBackend>,
    strategy: Box<dyn LayoutStrategy>,
}

impl CompatShim {
    pub fn new(backend: Arc<dyn ShapingBackend>) -> Self {
        let strategy = select_strategy(backend.capabilities());
        log::debug!("using {} layout strategy", strategy.name());
        Self { backend, strategy }
    }

    /// Use a specific strategy regardless of backend capabilities
    pub fn with_strategy(
        backend: Arc<dyn ShapingBackend>,
        strategy: Box<dyn LayoutStrategy>,
    ) -> Self {
        Self { backend, strategy }
    }

    pub fn backend(&self) -> &Arc<dyn ShapingBackend> {
        &self.backend
    }

    pub fn strategy(&self) -> &dyn LayoutStrategy {
        self.strategy.as_ref()
    }

    /// Build a general layout. The result never has more than `request.max_lines` lines,
    /// unless the text cannot be shortened further, and its line table is consistent
    /// whenever the backend allows repairing it.
    pub fn make(&self, request: &LayoutRequest<'_>) -> Result<Box<dyn Layout>, BackendError> {
        let mut layout = self.construct(request)?;
        if !self.strategy.enforces_max_lines() && request.max_lines > 0 {
            layout = self.correct_line_count(layout, request)?;
        }
        fix_line_table(layout.as_mut());
        Ok(layout)
    }

    /// Build a single line layout with precomputed metrics
    pub fn make_boring(
        &self,
        request: &LayoutRequest<'_>,
        boring: &BoringMetrics,
    ) -> Result<Box<dyn Layout>, BackendError> {
        self.backend.make_boring(request, boring)
    }

    fn construct(&self, request: &LayoutRequest<'_>) -> Result<Box<dyn Layout>, BackendError> {
        match self.strategy.build(self.backend.as_ref(), request) {
            Err(BackendError::TransientRace(reason)) => {
                log::debug!("retrying layout after transient backend fault: {}", reason);
                self.strategy.build(self.backend.as_ref(), request)
            }
            result => result,
        }
    }

    fn correct_line_count(
        &self,
        mut layout: Box<dyn Layout>,
        request: &LayoutRequest<'_>,
    ) -> Result<Box<dyn Layout>, BackendError> {
        let cap = request.max_lines;
        let source = request.text.as_str();
        let start = request.range.start;
        let mut kept_end = request.range.end;
        // `current` is either the source text or its truncated copy ending in an ellipsis
        let mut current = request.text.clone();
        let mut range = request.range.clone();

        while layout.line_count() > cap {
            let next_line = layout.line_start(cap);
            if next_line >= range.end {
                log::warn!("line count correction made no progress at offset {}", next_line);
                break;
            }

            let head = substr(current.as_str(), range.start..next_line)?;
            let mut end = (start + head.trim_end_matches(is_space).len()).min(kept_end);
            if end >= kept_end {
                // the ellipsis itself overflowed, give up one more character
                let kept = substr(source, start..kept_end)?;
                match kept.char_indices().next_back() {
                    Some((last, _)) => end = start + kept[..last].trim_end_matches(is_space).len(),
                    None => {
                        log::warn!("line count correction ran out of text to remove");
                        break;
                    }
                }
            }

            kept_end = end;
            current = request.text.clone();
            range = start..kept_end;
            layout = self.construct(&LayoutRequest {
                text: &current,
                range: range.clone(),
                ..request.clone()
            })?;

            if layout.line_count() >= cap && layout.ellipsis_count(cap - 1) == 0 {
                let ellipsized = format!("{}{}", substr(source, range.clone())?, SPACE_AND_ELLIPSIS);
                current = LayoutText::from(ellipsized);
                range = 0..current.len();
                layout = self.construct(&LayoutRequest {
                    text: &current,
                    range: range.clone(),
                    ..request.clone()
                })?;
            }
        }

        Ok(layout)
    }
}

impl fmt::Debug for CompatShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatShim")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

/// Repair line tables where a line ends before it starts by swapping the offending rows.
///
/// Scanning restarts after every swap. Returns false if an inconsistency remained.
pub fn fix_line_table(layout: &mut dyn Layout) -> bool {
    let count = layout.line_count();
    if count == 0 {
        return true;
    }
    let mut budget = count.saturating_mul(count);

    'scan: loop {
        let mut line_start = layout.line_start(0);
        for line in 0..count {
            let line_end = layout.line_end(line);
            if line_end < line_start {
                if budget == 0 {
                    log::warn!("giving up on repairing line table at line {}", line);
                    return false;
                }
                budget -= 1;
                if !layout.swap_line_bounds(line) {
                    log::warn!("line table is inconsistent at line {} and cannot be repaired", line);
                    return false;
                }
                continue 'scan;
            }
            line_start = line_end;
        }
        return true;
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

fn substr(text: &str, range: Range<usize>) -> Result<&str, BackendError> {
    let len = text.len();
    let index = range.end;
    text.get(range)
        .ok_or(BackendError::IndexOutOfBounds { index, len })
}
