// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement cache.
//!
//! One entry per feature, holding its anchor and one outcome per zoom bucket.
//! An entry whose feature or geometry revision no longer matches is dropped
//! as a whole; buckets are otherwise kept until the entry is evicted.

use std::hash::Hash;
use std::num::NonZeroUsize;

use geo::Point;
use lru::LruCache;
use rustc_hash::FxHashMap;

use crate::types::LabelRects;

/// A placement remembered in pixels relative to the anchor, so it can be
/// re-tested at any scale within its bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Rectangles centred on the anchor
    pub rects: LabelRects,
    pub width: f64,
    pub height: f64,
    pub content: String,
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedPlacement {
    Placed(Placement),
    NoFit,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub feature_revision: u64,
    pub geometry_revision: u64,
    /// `None` when the geometry has no usable anchor
    pub anchor: Option<Point<f64>>,
    pub buckets: FxHashMap<i32, CachedPlacement>,
}

#[derive(Debug)]
pub struct PlacementCache<K: Hash + Eq> {
    entries: LruCache<K, CacheEntry>,
}

impl<K: Hash + Eq + Copy> PlacementCache<K> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Entry for `key` at the given revisions, created with `anchor` when
    /// missing or stale.
    pub fn entry(
        &mut self,
        key: K,
        feature_revision: u64,
        geometry_revision: u64,
        anchor: impl FnOnce() -> Option<Point<f64>>,
    ) -> &mut CacheEntry {
        let stale = self.entries.peek(&key).is_some_and(|entry| {
            entry.feature_revision != feature_revision
                || entry.geometry_revision != geometry_revision
        });
        if stale {
            self.entries.pop(&key);
        }

        self.entries.get_or_insert_mut(key, || CacheEntry {
            feature_revision,
            geometry_revision,
            anchor: anchor(),
            buckets: FxHashMap::default(),
        })
    }

    pub fn get(&self, key: &K) -> Option<&CacheEntry> {
        self.entries.peek(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
