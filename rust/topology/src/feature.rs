// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged features and the arena that owns them.
//!
//! The [`FeatureStore`] is the single owner of caller-supplied features. Levels
//! refer to features by [`FeatureKey`] and keep any derived display geometry
//! in their own side tables, so a feature is never mutated by the engine.
//! Callers that retag a feature go through [`FeatureStore::set_tags`], which
//! bumps the feature's revision counter.

use indoor_lite_geometry::Shape;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::FeatureKey;
use crate::level_range::has_level_tag;

/// String key-value tags attached to a feature.
pub type Tags = FxHashMap<String, String>;

/// Entrance kinds that get a synthetic walkway
pub const WALKWAY_ENTRANCE_KINDS: [&str; 8] = [
    "yes",
    "main",
    "secondary",
    "service",
    "emergency",
    "exit",
    "home",
    "staircase",
];

/// Role of a feature in wall synthesis, derived from its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// `indoor=room` / `indoor=corridor`: walled space
    Room,
    /// `indoor=area`: walkable space without walls of its own
    Area,
    /// `indoor=wall`: explicitly drawn wall
    Wall,
    /// `indoor=level`: outline of a whole floor
    FloorOutline,
    /// `door=*` / `entrance=*`
    Door,
    /// `building=*` without a level: visible on every level
    Building,
    Other,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Room => "room",
            FeatureKind::Area => "area",
            FeatureKind::Wall => "wall",
            FeatureKind::FloorOutline => "floor outline",
            FeatureKind::Door => "door",
            FeatureKind::Building => "building",
            FeatureKind::Other => "other",
        }
    }
}

/// A geometric record with string tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub shape: Shape,
    pub tags: Tags,
    revision: u64,
}

impl Feature {
    pub fn new(shape: Shape, tags: Tags) -> Self {
        Self {
            shape,
            tags,
            revision: 0,
        }
    }

    /// Builds a feature from `(key, value)` pairs.
    pub fn with_tags<'a, I>(shape: Shape, tags: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let tags = tags
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(shape, tags)
    }

    /// Bumped whenever the tags change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn kind(&self) -> FeatureKind {
        match self.tag("indoor") {
            Some("room") | Some("corridor") => return FeatureKind::Room,
            Some("area") => return FeatureKind::Area,
            Some("wall") => return FeatureKind::Wall,
            Some("level") => return FeatureKind::FloorOutline,
            Some("door") => return FeatureKind::Door,
            _ => {}
        }

        if self.tags.contains_key("door") || self.tags.contains_key("entrance") {
            FeatureKind::Door
        } else if self.tags.contains_key("building") && !has_level_tag(&self.tags) {
            FeatureKind::Building
        } else {
            FeatureKind::Other
        }
    }

    /// Door opening width from `width` / `door:width`, or `default`.
    pub fn door_width(&self, default: f64) -> f64 {
        ["width", "door:width"]
            .iter()
            .filter_map(|k| self.tag(k))
            .filter_map(|v| v.trim().trim_end_matches('m').trim().parse::<f64>().ok())
            .find(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(default)
    }

    /// The `entrance` value if it is one that gets a walkway.
    pub fn walkway_entrance(&self) -> Option<&str> {
        self.tag("entrance")
            .filter(|kind| WALKWAY_ENTRANCE_KINDS.contains(kind))
    }
}

/// Arena owning every feature handed to the engine.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: SlotMap<FeatureKey, Feature>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: Feature) -> FeatureKey {
        self.features.insert(feature)
    }

    pub fn get(&self, key: FeatureKey) -> Option<&Feature> {
        self.features.get(key)
    }

    /// Like [`get`](Self::get) but reports a missing key as an error.
    pub fn try_get(&self, key: FeatureKey) -> Result<&Feature> {
        self.features.get(key).ok_or(Error::FeatureNotFound(key))
    }

    /// Replace a feature's tags and bump its revision.
    pub fn set_tags(&mut self, key: FeatureKey, tags: Tags) -> Result<()> {
        let feature = self
            .features
            .get_mut(key)
            .ok_or(Error::FeatureNotFound(key))?;
        feature.tags = tags;
        feature.revision += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &Feature)> {
        self.features.iter()
    }
}

impl std::ops::Index<FeatureKey> for FeatureStore {
    type Output = Feature;

    fn index(&self, key: FeatureKey) -> &Feature {
        &self.features[key]
    }
}
