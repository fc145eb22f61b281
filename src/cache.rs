// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide LRU cache of built layouts.
//!
//! Layouts are keyed by [`BuildParams::fingerprint`](crate::BuildParams::fingerprint). The
//! cache is best effort memoization: a fingerprint collision returns the layout of other
//! parameters, which is accepted.

use core::fmt;
use core::num::NonZeroUsize;
use std::sync::{Arc, LazyLock};

use lru::LruCache;
use parking_lot::Mutex;

use crate::Layout;

/// Default number of layouts kept by a [`LayoutCache`]
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

static GLOBAL_CACHE: LazyLock<Arc<LayoutCache>> =
    LazyLock::new(|| Arc::new(LayoutCache::default()));

/// Bounded layout cache, safe to share between threads.
pub struct LayoutCache {
    cache: Mutex<LruCache<u32, Arc<dyn Layout>>>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl LayoutCache {
    /// Create a new layout cache with the given capacity, at least one.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// The process-wide cache shared by builders that were not given one.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Get a layout, marking it as most recently used.
    pub fn get(&self, fingerprint: u32) -> Option<Arc<dyn Layout>> {
        self.cache.lock().get(&fingerprint).cloned()
    }

    /// Check if a layout is cached without updating LRU order.
    pub fn contains(&self, fingerprint: u32) -> bool {
        self.cache.lock().contains(&fingerprint)
    }

    /// Insert a layout, evicting the least recently used one when full.
    pub fn put(&self, fingerprint: u32, layout: Arc<dyn Layout>) {
        if let Some((evicted, _)) = self.cache.lock().push(fingerprint, layout) {
            if evicted != fingerprint {
                log::debug!("evicted layout {:#010x}", evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }

    /// Drop every cached layout.
    pub fn evict_all(&self) {
        self.cache.lock().clear();
    }

    /// Resize the cache capacity, evicting least recently used layouts as needed.
    pub fn resize(&self, capacity: usize) {
        self.cache
            .lock()
            .resize(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN));
    }
}

impl fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
