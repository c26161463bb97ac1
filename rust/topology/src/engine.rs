// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The topology engine: routes features into levels, merges levels whose
//! regions meet, and rebuilds walls on demand.
//!
//! Levels live in a slot map. For each level number, `by_number` keeps the
//! level keys in creation order, which is the stable order used for merging
//! and rebuilding. Merging is monotonic: a level absorbed into another is
//! removed for good and its members never leave the survivor.

use std::collections::{BTreeMap, BTreeSet};

use geo::{BoundingRect, MultiPolygon, Rect};
use indoor_lite_geometry::{buffer_shape, envelopes_intersect, BufferSpec, Shape};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureKind, FeatureStore, Tags};
use crate::keys::{FeatureKey, LevelKey};
use crate::level::{Level, Walkway};
use crate::level_range::feature_levels;
use crate::walkways::generate_entrance_walkways;
use crate::walls::synthesize_walls;

/// One renderable item returned by [`TopologyEngine::features_in`].
#[derive(Debug, Clone, Copy)]
pub enum MapItem<'a> {
    /// An original feature. `display` holds the wall-clipped geometry for
    /// polygon-ish members; `level` is `None` for always-visible features.
    Feature {
        key: FeatureKey,
        feature: &'a Feature,
        display: Option<&'a MultiPolygon<f64>>,
        level: Option<i32>,
    },
    Wall {
        level: i32,
        area: &'a MultiPolygon<f64>,
    },
    Walkway {
        level: i32,
        walkway: &'a Walkway,
    },
}

#[derive(Debug, Default)]
pub struct TopologyEngine {
    config: EngineConfig,
    features: FeatureStore,
    levels: SlotMap<LevelKey, Level>,
    by_number: BTreeMap<i32, Vec<LevelKey>>,
    always_visible: Vec<FeatureKey>,
    next_seq: u64,
    /// Last wall generation handed out, shared by all levels
    last_generation: u64,
}

impl TopologyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureStore {
        &self.features
    }

    pub fn feature(&self, key: FeatureKey) -> Option<&Feature> {
        self.features.get(key)
    }

    /// Take ownership of a feature and route it into its levels.
    ///
    /// A feature whose level tag yields no levels is kept. It becomes
    /// always-visible if it is a whole-building outline and is otherwise
    /// never returned by level queries.
    pub fn add_feature(&mut self, feature: Feature) -> FeatureKey {
        let numbers = feature_levels(&feature.tags);
        let kind = feature.kind();
        let key = self.features.insert(feature);

        if numbers.is_empty() {
            if kind == FeatureKind::Building {
                self.always_visible.push(key);
            } else {
                tracing::debug!(?key, kind = kind.as_str(), "Feature has no level membership");
            }
            return key;
        }

        for number in numbers {
            self.route(key, number);
        }
        key
    }

    /// Replace a feature's tags, bump its revision and mark its levels dirty.
    ///
    /// Level membership is not recomputed.
    pub fn update_tags(&mut self, key: FeatureKey, tags: Tags) -> Result<()> {
        self.features.set_tags(key, tags)?;
        for level in self.levels.values_mut() {
            if level.members.contains(&key) {
                level.dirty = true;
            }
        }
        Ok(())
    }

    fn route(&mut self, key: FeatureKey, number: i32) {
        // Regions are already inflated, so the raw shape is tested
        let shape = &self.features[key].shape;
        let grown = shape
            .is_area()
            .then(|| buffer_shape(shape, BufferSpec::flat(self.config.outer_wall_width)));

        let keys = self.by_number.entry(number).or_default();
        let hits: Vec<LevelKey> = keys
            .iter()
            .copied()
            .filter(|lk| shape.intersects_region(&self.levels[*lk].region))
            .collect();

        let Some((&survivor, rest)) = hits.split_first() else {
            let seed = match grown {
                Some(area) => area,
                None => buffer_shape(shape, BufferSpec::flat(self.config.outer_wall_width)),
            };
            let mut level = Level::new(number, self.next_seq, seed);
            self.next_seq += 1;
            level.attach(key, None);
            keys.push(self.levels.insert(level));
            return;
        };

        if !rest.is_empty() {
            keys.retain(|lk| !rest.contains(lk));
            let absorbed: Vec<Level> = rest
                .iter()
                .filter_map(|lk| self.levels.remove(*lk))
                .collect();
            tracing::debug!(number, merged = absorbed.len() + 1, "Merging levels");
            self.levels[survivor].absorb(absorbed);
        }
        self.levels[survivor].attach(key, grown.as_ref());
    }

    pub fn level(&self, key: LevelKey) -> Option<&Level> {
        self.levels.get(key)
    }

    pub fn try_level(&self, key: LevelKey) -> Result<&Level> {
        self.levels.get(key).ok_or(Error::LevelNotFound(key))
    }

    /// Number of distinct levels with this level number.
    pub fn level_count(&self, number: i32) -> usize {
        self.by_number.get(&number).map_or(0, Vec::len)
    }

    /// Levels with this number, in creation order.
    pub fn levels(&self, number: i32) -> impl Iterator<Item = (LevelKey, &Level)> + '_ {
        self.by_number
            .get(&number)
            .into_iter()
            .flatten()
            .map(move |&lk| (lk, &self.levels[lk]))
    }

    /// Levels with this number whose region reaches into `extent`.
    pub fn levels_at(&self, number: i32, extent: &Rect<f64>) -> Vec<LevelKey> {
        self.levels(number)
            .filter(|(_, level)| region_meets(&level.region, extent))
            .map(|(lk, _)| lk)
            .collect()
    }

    /// Distinct level numbers present within `extent`, ascending.
    pub fn levels_in(&self, extent: &Rect<f64>) -> Vec<i32> {
        let numbers: BTreeSet<i32> = self
            .levels
            .values()
            .filter(|level| region_meets(&level.region, extent))
            .map(|level| level.number)
            .collect();
        numbers.into_iter().collect()
    }

    /// The level with this number that holds `feature`.
    pub fn level_of(&self, feature: FeatureKey, number: i32) -> Option<LevelKey> {
        self.levels(number)
            .find(|(_, level)| level.members.contains(&feature))
            .map(|(lk, _)| lk)
    }

    /// Dirty levels within `extent`, in creation order.
    pub fn dirty_levels(&self, number: i32, extent: &Rect<f64>) -> Vec<LevelKey> {
        self.levels_at(number, extent)
            .into_iter()
            .filter(|lk| self.levels[*lk].dirty)
            .collect()
    }

    /// Rebuild one level's walls, display geometry and walkways.
    ///
    /// Runs to completion; the level is clean afterwards.
    pub fn rebuild_level(&mut self, key: LevelKey) -> Result<()> {
        let level = self.levels.get(key).ok_or(Error::LevelNotFound(key))?;
        let members = level
            .members
            .iter()
            .filter_map(|&fk| self.features.get(fk).map(|f| (fk, f)));
        let synthesis = synthesize_walls(members, &self.config);

        self.last_generation += 1;
        let level = self.levels.get_mut(key).ok_or(Error::LevelNotFound(key))?;
        level.wall = synthesis.wall;
        level.display = synthesis.display;
        generate_entrance_walkways(level, &self.features, &synthesis.rooms, &self.config);
        level.wall_generation = self.last_generation;
        level.dirty = false;

        tracing::trace!(
            number = level.number,
            members = level.members.len(),
            generation = level.wall_generation,
            "Rebuilt level"
        );
        Ok(())
    }

    /// Rebuild every dirty level, ignoring any time budget.
    pub fn rebuild_all(&mut self) -> Result<()> {
        let mut dirty: Vec<(u64, LevelKey)> = self
            .levels
            .iter()
            .filter(|(_, level)| level.dirty)
            .map(|(lk, level)| (level.seq, lk))
            .collect();
        dirty.sort_unstable();
        for (_, key) in dirty {
            self.rebuild_level(key)?;
        }
        Ok(())
    }

    /// Features, walls and walkways visible on `number` within `extent`.
    ///
    /// Each feature appears at most once even if it is a member of several
    /// levels. Always-visible features come last.
    pub fn features_in(&self, number: i32, extent: &Rect<f64>) -> Vec<MapItem<'_>> {
        let mut seen: FxHashSet<FeatureKey> = FxHashSet::default();
        let mut items = Vec::new();

        for lk in self.levels_at(number, extent) {
            let level = &self.levels[lk];
            for &key in &level.members {
                let Some(feature) = self.features.get(key) else {
                    continue;
                };
                if shape_meets(&feature.shape, extent) && seen.insert(key) {
                    items.push(MapItem::Feature {
                        key,
                        feature,
                        display: level.display.get(&key),
                        level: Some(number),
                    });
                }
            }
            if region_meets(&level.wall, extent) {
                items.push(MapItem::Wall {
                    level: number,
                    area: &level.wall,
                });
            }
            items.extend(level.walkways.iter().map(|walkway| MapItem::Walkway {
                level: number,
                walkway,
            }));
        }

        for &key in &self.always_visible {
            if let Some(feature) = self.features.get(key) {
                if shape_meets(&feature.shape, extent) && seen.insert(key) {
                    items.push(MapItem::Feature {
                        key,
                        feature,
                        display: None,
                        level: None,
                    });
                }
            }
        }

        items
    }

    /// Wall areas on `number` within `extent`, for label occupancy.
    pub fn wall_polygons(&self, number: i32, extent: &Rect<f64>) -> Vec<&MultiPolygon<f64>> {
        self.levels_at(number, extent)
            .into_iter()
            .map(|lk| &self.levels[lk].wall)
            .filter(|wall| !wall.0.is_empty())
            .collect()
    }
}

fn region_meets(area: &MultiPolygon<f64>, extent: &Rect<f64>) -> bool {
    area.bounding_rect()
        .is_some_and(|rect| envelopes_intersect(&rect, extent))
}

fn shape_meets(shape: &Shape, extent: &Rect<f64>) -> bool {
    shape
        .bounding_rect()
        .is_some_and(|rect| envelopes_intersect(&rect, extent))
}
