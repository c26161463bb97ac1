// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-frame pipeline: feature intake, budgeted wall rebuilds and label
//! placement for the level in view.

use geo::{BoundingRect, Rect};
use indoor_lite_geometry::Shape;
use indoor_lite_labels::{Candidate, LabelEngine, PlacedLabel, PlacementReport};
use indoor_lite_topology::{
    Clock, Feature, FeatureKey, FeatureKind, MapItem, PassOutcome, RebuildScheduler, SystemClock,
    Tags, TopologyEngine,
};

use crate::config::Config;
use crate::error::Result;
use crate::geojson::FeatureCollection;
use crate::measure::{label_variant, TagMeasurer, TextLayout};

/// What the caller is looking at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub level: i32,
    pub extent: Rect<f64>,
    pub zoom: f64,
}

/// Everything needed to draw one frame.
#[derive(Debug)]
pub struct FrameOutput<'a> {
    pub items: Vec<MapItem<'a>>,
    pub labels: Vec<PlacedLabel<FeatureKey>>,
    /// Level numbers present in the view, for a level switcher
    pub levels: Vec<i32>,
    pub report: PlacementReport,
}

#[derive(Debug)]
pub struct IndoorMap<C: Clock = SystemClock> {
    config: Config,
    engine: TopologyEngine,
    scheduler: RebuildScheduler<C>,
    labels: LabelEngine<FeatureKey>,
}

impl IndoorMap<SystemClock> {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> IndoorMap<C> {
    pub fn with_clock(config: Config, clock: C) -> Self {
        Self {
            engine: TopologyEngine::new(config.engine.clone()),
            scheduler: RebuildScheduler::new(clock),
            labels: LabelEngine::new(config.labels.clone()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &TopologyEngine {
        &self.engine
    }

    pub fn add_feature(&mut self, feature: Feature) -> FeatureKey {
        self.engine.add_feature(feature)
    }

    /// Add every usable feature of a GeoJSON feature collection.
    pub fn load_geojson(&mut self, json: &str) -> Result<usize> {
        let features = FeatureCollection::from_json(json)?.into_features();
        let count = features.len();
        for feature in features {
            self.engine.add_feature(feature);
        }
        tracing::info!(count, levels = self.engine.levels_in(&everywhere()).len(), "Loaded features");
        Ok(count)
    }

    pub fn update_tags(&mut self, key: FeatureKey, tags: Tags) -> Result<()> {
        Ok(self.engine.update_tags(key, tags)?)
    }

    /// Rebuild every dirty level now, without a time budget.
    pub fn rebuild_all(&mut self) -> Result<()> {
        Ok(self.engine.rebuild_all()?)
    }

    /// Bounds of all features, if any.
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.engine
            .features()
            .iter()
            .filter_map(|(_, f)| f.shape.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }

    /// Run a rebuild pass for the view if one is due.
    ///
    /// A deferred pass waits for its retry delay; otherwise a pass starts as
    /// soon as the view has dirty levels.
    pub fn tick(&mut self, view: &View) -> Result<Option<PassOutcome>> {
        if self.scheduler.pending() {
            return Ok(self.scheduler.poll(&mut self.engine, view.level, &view.extent)?);
        }
        if self.engine.dirty_levels(view.level, &view.extent).is_empty() {
            return Ok(None);
        }
        Ok(Some(self.scheduler.run_pass(
            &mut self.engine,
            view.level,
            &view.extent,
        )?))
    }

    /// Query the view and place its labels, with walls as occupied space.
    pub fn frame<L>(&mut self, view: &View, layout: &mut L) -> Result<FrameOutput<'_>>
    where
        L: TextLayout + ?Sized,
    {
        let items = self.engine.features_in(view.level, &view.extent);
        let candidates = label_candidates(&self.engine, &items);

        let walls = self.engine.wall_polygons(view.level, &view.extent);
        let mut measurer = TagMeasurer::new(self.engine.features(), layout);
        let pass = self.labels.place_labels(
            candidates,
            walls,
            self.config.frame(view.zoom),
            &mut measurer,
        )?;

        Ok(FrameOutput {
            items,
            labels: pass.labels,
            levels: self.engine.levels_in(&view.extent),
            report: pass.report,
        })
    }
}

fn everywhere() -> Rect<f64> {
    Rect::new(
        geo::coord! { x: f64::MIN, y: f64::MIN },
        geo::coord! { x: f64::MAX, y: f64::MAX },
    )
}

/// Labelable features among `items`, with wall-clipped geometry where the
/// level provides it.
fn label_candidates(engine: &TopologyEngine, items: &[MapItem<'_>]) -> Vec<Candidate<FeatureKey>> {
    items
        .iter()
        .filter_map(|item| {
            let MapItem::Feature {
                key,
                feature,
                display,
                level,
            } = *item
            else {
                return None;
            };
            if matches!(
                feature.kind(),
                FeatureKind::Wall | FeatureKind::FloorOutline | FeatureKind::Building
            ) {
                return None;
            }
            let variant = label_variant(feature)?;

            let shape = match display {
                Some(area) if !area.0.is_empty() => Shape::MultiPolygon(area.clone()),
                Some(_) => return None,
                None => feature.shape.clone(),
            };
            let generation = level
                .and_then(|number| engine.level_of(key, number))
                .and_then(|lk| engine.level(lk))
                .map_or(0, |l| l.wall_generation());

            Some(
                Candidate::new(key, shape, variant).with_revisions(feature.revision(), generation),
            )
        })
        .collect()
}
