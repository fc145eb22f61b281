// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::{Color, LayoutError};

bitflags::bitflags! {
    /// Character style carried by an [`Annotation::Style`] span
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct SpanStyle: u8 {
        const BOLD = 1;
        const ITALIC = 2;
        const UNDERLINE = 4;
        const STRIKETHROUGH = 8;
    }
}

/// Callback run when a clickable region is activated.
///
/// Handlers compare and hash by identity, two handlers are equal only when they share the
/// same allocation.
#[derive(Clone)]
pub struct ClickHandler(Arc<dyn Fn() + Send + Sync>);

impl ClickHandler {
    pub fn new<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        Self(Arc::new(f))
    }

    pub fn click(&self) {
        (self.0)()
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ClickHandler {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ClickHandler {}

impl Hash for ClickHandler {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClickHandler").finish()
    }
}

/// Metadata attached to a range of rich text
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Annotation {
    Style {
        style: SpanStyle,
        color: Option<Color>,
    },
    /// Non-interactive link target
    Link(SmolStr),
    /// Interactive region; layouts of text carrying one are never shared between builders
    Clickable(ClickHandler),
}

impl Annotation {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Clickable(_))
    }
}

/// An annotated byte range. A span without annotation is malformed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    pub range: Range<usize>,
    pub annotation: Option<Annotation>,
}

/// Text with annotations attached to byte ranges
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RichText {
    text: Arc<str>,
    spans: Arc<Vec<Span>>,
}

impl RichText {
    pub fn new<T: Into<Arc<str>>>(text: T) -> Self {
        Self {
            text: text.into(),
            spans: Arc::new(Vec::new()),
        }
    }

    /// Add a span, passing `None` records a span without annotation
    pub fn with_span<A: Into<Option<Annotation>>>(
        mut self,
        range: Range<usize>,
        annotation: A,
    ) -> Self {
        Arc::make_mut(&mut self.spans).push(Span {
            range,
            annotation: annotation.into(),
        });
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }
}

/// Content of a layout: either a plain string or annotated rich text
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum LayoutText {
    Plain(Arc<str>),
    Rich(RichText),
}

impl LayoutText {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Rich(rich) => rich.as_str(),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, Self::Rich(_))
    }

    pub fn spans(&self) -> &[Span] {
        match self {
            Self::Plain(_) => &[],
            Self::Rich(rich) => rich.spans(),
        }
    }

    /// Whether any span carries an interactive annotation
    pub fn has_clickable(&self) -> bool {
        self.spans()
            .iter()
            .any(|span| span.annotation.as_ref().is_some_and(Annotation::is_interactive))
    }

    /// Reject spans that have no annotation, are reversed, or do not cover whole characters
    /// of the text
    pub fn validate(&self) -> Result<(), LayoutError> {
        let text = self.as_str();
        match self.spans().iter().position(|span| {
            span.annotation.is_none()
                || span.range.start > span.range.end
                || !text.is_char_boundary(span.range.start)
                || !text.is_char_boundary(span.range.end)
        }) {
            Some(index) => Err(LayoutError::MalformedSpan { index }),
            None => Ok(()),
        }
    }

    /// The same characters with every annotation removed
    pub fn to_plain(&self) -> Self {
        match self {
            Self::Plain(_) => self.clone(),
            Self::Rich(rich) => Self::Plain(rich.text.clone()),
        }
    }

    /// Plain copy of a byte range, `None` when the range is not on char boundaries
    pub fn slice(&self, range: Range<usize>) -> Option<Self> {
        self.as_str().get(range).map(Self::from)
    }
}

impl Default for LayoutText {
    fn default() -> Self {
        Self::Plain(Arc::from(""))
    }
}

impl From<&str> for LayoutText {
    fn from(text: &str) -> Self {
        Self::Plain(Arc::from(text))
    }
}

impl From<String> for LayoutText {
    fn from(text: String) -> Self {
        Self::Plain(Arc::from(text))
    }
}

impl From<Arc<str>> for LayoutText {
    fn from(text: Arc<str>) -> Self {
        Self::Plain(text)
    }
}

impl From<RichText> for LayoutText {
    fn from(text: RichText) -> Self {
        Self::Rich(text)
    }
}

impl fmt::Display for LayoutText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
