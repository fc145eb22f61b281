// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::Debug;

/// Per-builder result slot. `Clean` holds a value built from the current parameters,
/// `Dirty` means a parameter changed since.
#[derive(Clone, Debug, Default)]
pub(crate) enum Saved<T: Clone + Debug> {
    #[default]
    Dirty,
    Clean(T),
}

impl<T: Clone + Debug> Saved<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Dirty => None,
            Self::Clean(t) => Some(t),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean(_))
    }

    pub fn invalidate(&mut self) {
        *self = Self::Dirty;
    }

    pub fn store(&mut self, val: T) {
        *self = Self::Clean(val);
    }
}
