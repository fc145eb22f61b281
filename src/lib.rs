// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Text Layout Builder
//!
//! This library builds and caches multi-line text layouts on top of a pluggable shaping
//! backend. It does not shape or break text itself: a [`ShapingBackend`] does, and this crate
//! takes care of configuring it, working around its defects and reusing its output.
//!
//! Start by creating a backend, after which you can create a [`TextLayoutBuilder`], give it
//! some text and constraints, and build a [`Layout`]. Layouts built from equal parameters are
//! shared through a [`LayoutCache`].
//!
//! ```
//! # #[cfg(feature = "monospace")]
//! # {
//! use std::sync::Arc;
//! use text_layout_builder::{measure, Color, Ellipsize, MonospaceBackend, TextLayoutBuilder};
//!
//! // A backend performs the actual layout, create one per application
//! let backend = Arc::new(MonospaceBackend::new());
//!
//! // A builder holds the parameters of one piece of text, create one per text widget
//! let mut builder = TextLayoutBuilder::new(backend);
//!
//! // Add some text!
//! builder
//!     .set_text("Hello, Rust! 🦀\nA second paragraph that is a bit longer")
//!     .unwrap()
//!     .set_width(120)
//!     .set_text_size(14.0)
//!     .set_text_color(Color::rgb(0xFF, 0xFF, 0xFF))
//!     .set_max_lines(2)
//!     .set_ellipsize(Some(Ellipsize::End));
//!
//! // Build the layout, `None` means there was nothing to lay out
//! let layout = builder.build().unwrap().unwrap();
//! assert_eq!(layout.line_count(), 2);
//! assert!(measure::width(Some(layout.as_ref())) <= 120);
//!
//! // Draw the layout
//! layout.draw(&mut |x, y, w, h, color| {
//!     // Fill in your code here for drawing rectangles
//! });
//! # }
//! ```

pub use self::attrs::*;
mod attrs;

pub use self::backend::*;
mod backend;

pub use self::builder::*;
mod builder;

pub use self::cache::*;
mod cache;

pub use self::compat::*;
mod compat;

pub use self::error::*;
mod error;

pub mod measure;

#[cfg(feature = "monospace")]
pub use self::monospace::*;
#[cfg(feature = "monospace")]
mod monospace;

pub use self::params::*;
mod params;

mod saved;

pub use self::text::*;
mod text;

pub use self::warmer::*;
mod warmer;
