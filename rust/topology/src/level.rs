// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A level: one spatially connected cluster of features at one level number.
//!
//! The `region` is a conservative envelope (member areas inflated by the
//! outer wall width) used only to decide which features and levels belong
//! together. It is never rendered. The wall polygon, the clipped display
//! geometry of members and the entrance walkways are derived state, rebuilt
//! whenever the level is dirty.

use geo::{LineString, MultiPolygon};
use indoor_lite_geometry::{empty_area, union_all};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::feature::Tags;
use crate::keys::FeatureKey;

/// A synthetic footway leading out of a room from an entrance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walkway {
    pub entrance: FeatureKey,
    /// From the outer end to the room boundary
    pub line: LineString<f64>,
}

impl Walkway {
    /// Tags carried when the walkway is exported as a feature.
    pub fn tags(&self) -> Tags {
        let mut tags = Tags::default();
        tags.insert("highway".to_string(), "footway".to_string());
        tags.insert("footway".to_string(), "entrance_walkway".to_string());
        tags
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    pub(crate) number: i32,
    /// Creation order, the tie-break for every iteration over levels
    pub(crate) seq: u64,
    pub(crate) region: MultiPolygon<f64>,
    pub(crate) members: Vec<FeatureKey>,
    pub(crate) wall: MultiPolygon<f64>,
    pub(crate) display: FxHashMap<FeatureKey, MultiPolygon<f64>>,
    pub(crate) walkways: Vec<Walkway>,
    pub(crate) processed_entrances: FxHashSet<FeatureKey>,
    pub(crate) dirty: bool,
    pub(crate) wall_generation: u64,
}

impl Level {
    pub(crate) fn new(number: i32, seq: u64, region: MultiPolygon<f64>) -> Self {
        Self {
            number,
            seq,
            region,
            members: Vec::new(),
            wall: empty_area(),
            display: FxHashMap::default(),
            walkways: Vec::new(),
            processed_entrances: FxHashSet::default(),
            dirty: true,
            wall_generation: 0,
        }
    }

    /// Add a member, growing the region by `grown` when given.
    ///
    /// A feature already in the member list is not added twice.
    pub(crate) fn attach(&mut self, key: FeatureKey, grown: Option<&MultiPolygon<f64>>) {
        if !self.members.contains(&key) {
            self.members.push(key);
        }
        if let Some(area) = grown {
            self.region = union_all([&self.region, area]);
        }
        self.dirty = true;
    }

    /// Fold `others` into this level. Regions are unioned in one pass and
    /// member lists concatenated; the result does not depend on order.
    pub(crate) fn absorb(&mut self, others: Vec<Level>) {
        if others.is_empty() {
            return;
        }
        let regions: Vec<&MultiPolygon<f64>> = std::iter::once(&self.region)
            .chain(others.iter().map(|l| &l.region))
            .collect();
        let region = union_all(regions);

        for other in others {
            for key in other.members {
                if !self.members.contains(&key) {
                    self.members.push(key);
                }
            }
            self.walkways.extend(other.walkways);
            self.processed_entrances.extend(other.processed_entrances);
        }
        self.region = region;
        self.dirty = true;
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn region(&self) -> &MultiPolygon<f64> {
        &self.region
    }

    pub fn members(&self) -> &[FeatureKey] {
        &self.members
    }

    /// The synthesized wall area; empty until the first rebuild.
    pub fn wall(&self) -> &MultiPolygon<f64> {
        &self.wall
    }

    /// Member geometry with the wall subtracted, for polygon-ish members.
    pub fn display_geometry(&self, key: FeatureKey) -> Option<&MultiPolygon<f64>> {
        self.display.get(&key)
    }

    pub fn walkways(&self) -> &[Walkway] {
        &self.walkways
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stamp of the last completed wall rebuild, zero before the first.
    ///
    /// Stamps are unique across all levels of an engine, so two levels never
    /// report the same generation once rebuilt.
    pub fn wall_generation(&self) -> u64 {
        self.wall_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use indoor_lite_geometry::rect_polygon;
    use slotmap::SlotMap;

    fn area(min: f64, max: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![rect_polygon(min, min, max, max)])
    }

    #[test]
    fn attach_is_idempotent_and_marks_dirty() {
        let mut keys: SlotMap<FeatureKey, ()> = SlotMap::with_key();
        let k = keys.insert(());

        let mut level = Level::new(0, 0, area(0.0, 1.0));
        level.dirty = false;
        level.attach(k, None);
        level.attach(k, None);

        assert_eq!(level.members(), &[k]);
        assert!(level.is_dirty());
    }

    #[test]
    fn absorb_unions_regions_and_members() {
        let mut keys: SlotMap<FeatureKey, ()> = SlotMap::with_key();
        let (a, b, c) = (keys.insert(()), keys.insert(()), keys.insert(()));

        let mut first = Level::new(0, 0, area(0.0, 2.0));
        first.attach(a, None);
        let mut second = Level::new(0, 1, area(1.0, 3.0));
        second.attach(b, None);
        second.attach(a, None);
        let mut third = Level::new(0, 2, area(10.0, 11.0));
        third.attach(c, None);

        first.dirty = false;
        first.absorb(vec![second, third]);

        assert_eq!(first.members(), &[a, b, c]);
        assert!((first.region().unsigned_area() - 8.0).abs() < 1e-6);
        assert!(first.is_dirty());
    }

    #[test]
    fn walkway_tags() {
        let mut keys: SlotMap<FeatureKey, ()> = SlotMap::with_key();
        let walkway = Walkway {
            entrance: keys.insert(()),
            line: LineString::new(Vec::new()),
        };
        let tags = walkway.tags();
        assert_eq!(tags.get("highway").map(String::as_str), Some("footway"));
    }
}
