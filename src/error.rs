// SPDX-License-Identifier: MIT OR Apache-2.0

/// Failures reported by a [`ShapingBackend`](crate::ShapingBackend)
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The requested construction path does not exist in this backend
    #[error("construction path is not supported by this backend")]
    Unsupported,
    /// Internal state race inside the backend; the identical call may succeed when repeated
    #[error("transient backend race: {0}")]
    TransientRace(String),
    /// The backend indexed past the end of the text while constructing a layout
    #[error("index {index} out of bounds for text of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("{0}")]
    Other(String),
}

/// Failures reported by [`TextLayoutBuilder`](crate::TextLayoutBuilder)
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The text carries a span without an annotation or outside of the text; drawing such
    /// text fails later on
    #[error("span {index} of the given text is malformed and cannot be laid out")]
    MalformedSpan { index: usize },
    #[error("unexpected measure mode {0}")]
    UnknownMeasureMode(i32),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
