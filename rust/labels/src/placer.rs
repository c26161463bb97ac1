// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Label placement.
//!
//! A pass orders the candidates (areas before points, smaller areas first),
//! resets the occupancy of placed labels and records the external occupancy,
//! then places each candidate in turn:
//!
//! - A cached placement for the current zoom bucket is only collision
//!   checked at the anchor. A cached "no fit" is final until the feature
//!   changes.
//! - Otherwise a search measures the current variant, centres it on the
//!   anchor and accepts it if it lies inside the feature's area and collides
//!   with nothing. A rejected footprint is shrunk to the width that overlaps
//!   the area and measured again, up to the iteration cap. A variant that
//!   measures empty, overflows the area or shrinks below the minimum width
//!   hands over to its fallback variant.

use std::cmp::Ordering;
use std::hash::Hash;

use geo::{Area, BoundingRect, Coord, MultiPolygon, Point, Rect};
use indoor_lite_geometry::{contains_region, intersection, pole_of_inaccessibility, union_all, Shape};
use smallvec::SmallVec;

use crate::cache::{CachedPlacement, Placement, PlacementCache};
use crate::config::LabelConfig;
use crate::error::{Error, MeasureError, Result};
use crate::occupancy::Occupancy;
use crate::types::{
    Candidate, Frame, LabelRects, Measured, PlacedLabel, PlacementPass, PlacementReport,
    TextMeasurer,
};

/// Caller-supplied ordering among candidates of the same class and area.
pub type TieBreak<K> = Box<dyn Fn(&Candidate<K>, &Candidate<K>) -> Ordering>;

pub struct LabelEngine<K: Hash + Eq + Copy> {
    config: LabelConfig,
    cache: PlacementCache<K>,
    placed: Occupancy,
    external: Occupancy,
    tie_break: Option<TieBreak<K>>,
}

impl<K: Hash + Eq + Copy> std::fmt::Debug for LabelEngine<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelEngine")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("placed", &self.placed.len())
            .field("external", &self.external.len())
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Copy> Default for LabelEngine<K> {
    fn default() -> Self {
        Self::new(LabelConfig::default())
    }
}

/// Outcome of one variant's search
struct VariantSearch {
    placement: Option<Placement>,
    fallback: Option<String>,
}

impl<K: Hash + Eq + Copy> LabelEngine<K> {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            cache: PlacementCache::new(config.cache_capacity),
            placed: Occupancy::new(config.grid_cell_size),
            external: Occupancy::new(config.grid_cell_size),
            config,
            tie_break: None,
        }
    }

    pub fn with_tie_break(
        mut self,
        tie_break: impl Fn(&Candidate<K>, &Candidate<K>) -> Ordering + 'static,
    ) -> Self {
        self.tie_break = Some(Box::new(tie_break));
        self
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    pub fn cache(&self) -> &PlacementCache<K> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Place labels for one frame.
    ///
    /// `occupied_externally` is space no label may overlap, typically the
    /// walls in view. Only an unusable `frame` fails the pass; a candidate
    /// whose measurement fails is skipped and counted in the report.
    pub fn place_labels<'a, M, E>(
        &mut self,
        candidates: Vec<Candidate<K>>,
        occupied_externally: E,
        frame: Frame,
        measurer: &mut M,
    ) -> Result<PlacementPass<K>>
    where
        M: TextMeasurer<K> + ?Sized,
        E: IntoIterator<Item = &'a MultiPolygon<f64>>,
    {
        let ppu = frame.pixels_per_unit;
        if !ppu.is_finite() || ppu <= 0.0 || !frame.zoom.is_finite() {
            return Err(Error::InvalidFrame {
                zoom: frame.zoom,
                pixels_per_unit: ppu,
            });
        }

        let candidates = order_candidates(candidates, self.tie_break.as_deref());

        let cell_size = self.config.grid_cell_size / ppu;
        self.placed = Occupancy::new(cell_size);
        self.external = Occupancy::new(cell_size);
        for area in occupied_externally {
            self.external.insert(area.clone());
        }

        let bucket = self.config.zoom_bucket(frame.zoom);
        let mut labels = Vec::new();
        let mut report = PlacementReport::default();

        for candidate in &candidates {
            match self.place_one(candidate, frame, bucket, measurer) {
                Ok(Some(label)) => {
                    report.placed += 1;
                    labels.push(label);
                }
                Ok(None) => report.no_fit += 1,
                Err(error) => {
                    let error = Error::from(error);
                    tracing::warn!(%error, "Skipping label");
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            bucket,
            placed = report.placed,
            no_fit = report.no_fit,
            failed = report.failed,
            "Label pass finished"
        );
        Ok(PlacementPass { labels, report })
    }

    fn place_one<M>(
        &mut self,
        candidate: &Candidate<K>,
        frame: Frame,
        bucket: i32,
        measurer: &mut M,
    ) -> std::result::Result<Option<PlacedLabel<K>>, MeasureError>
    where
        M: TextMeasurer<K> + ?Sized,
    {
        let area = candidate.shape.to_multi_polygon();
        let precision = self.config.pole_precision_px / frame.pixels_per_unit;

        let entry = self.cache.entry(
            candidate.key,
            candidate.feature_revision,
            candidate.geometry_revision,
            || anchor_of(&candidate.shape, area.as_ref(), precision),
        );
        let Some(anchor) = entry.anchor else {
            return Ok(None);
        };

        match entry.buckets.get(&bucket) {
            Some(CachedPlacement::NoFit) => return Ok(None),
            Some(CachedPlacement::Placed(placement)) => {
                let placement = placement.clone();
                let footprint = footprint(&placement.rects, anchor, frame.pixels_per_unit);
                if !self.collides(&footprint) {
                    return Ok(Some(self.occupy(candidate.key, anchor, placement, footprint, true)));
                }
            }
            None => {}
        }

        let outcome = match self.search(candidate, area.as_ref(), anchor, frame, measurer)? {
            Some(placement) => CachedPlacement::Placed(placement),
            None => CachedPlacement::NoFit,
        };

        let entry = self.cache.entry(
            candidate.key,
            candidate.feature_revision,
            candidate.geometry_revision,
            || Some(anchor),
        );
        entry.buckets.insert(bucket, outcome.clone());

        Ok(match outcome {
            CachedPlacement::Placed(placement) => {
                let footprint = footprint(&placement.rects, anchor, frame.pixels_per_unit);
                Some(self.occupy(candidate.key, anchor, placement, footprint, false))
            }
            CachedPlacement::NoFit => None,
        })
    }

    /// Walk the variant chain until one fits.
    fn search<M>(
        &self,
        candidate: &Candidate<K>,
        area: Option<&MultiPolygon<f64>>,
        anchor: Point<f64>,
        frame: Frame,
        measurer: &mut M,
    ) -> std::result::Result<Option<Placement>, MeasureError>
    where
        M: TextMeasurer<K> + ?Sized,
    {
        let mut variant = candidate.default_variant.clone();
        let mut tried: SmallVec<[String; 4]> = SmallVec::new();

        loop {
            let search = self.search_variant(candidate, &variant, area, anchor, frame, measurer)?;
            if search.placement.is_some() {
                return Ok(search.placement);
            }
            tried.push(variant);
            match search.fallback {
                Some(next) if !tried.contains(&next) => variant = next,
                _ => return Ok(None),
            }
        }
    }

    fn search_variant<M>(
        &self,
        candidate: &Candidate<K>,
        variant: &str,
        area: Option<&MultiPolygon<f64>>,
        anchor: Point<f64>,
        frame: Frame,
        measurer: &mut M,
    ) -> std::result::Result<VariantSearch, MeasureError>
    where
        M: TextMeasurer<K> + ?Sized,
    {
        let ppu = frame.pixels_per_unit;
        let limit = area
            .and_then(|a| a.bounding_rect())
            .map(|bounds| bounds.width() * ppu);
        let mut max_width = limit.unwrap_or(self.config.point_max_width_px);
        let mut fallback = None;

        for _ in 0..self.config.max_iterations {
            let measured = measurer.measure(candidate, variant, max_width)?;
            fallback = measured.fallback.clone();

            let Some(bounds) = measured.bounds().filter(|b| b.width() > 0.0) else {
                break;
            };
            let width = bounds.width();
            if !measured.allow_overflow && limit.is_some_and(|limit| width > limit) {
                break;
            }

            let rects = centred(&measured, bounds);
            let footprint = footprint(&rects, anchor, ppu);
            let inside = match area {
                Some(area) if !measured.allow_overflow => contains_region(area, &footprint),
                _ => true,
            };

            if inside && !self.collides(&footprint) {
                let Measured { content, .. } = measured;
                return Ok(VariantSearch {
                    placement: Some(Placement {
                        rects,
                        width,
                        height: bounds.height(),
                        content,
                        variant: variant.to_string(),
                    }),
                    fallback,
                });
            }

            let fit = match area {
                Some(area) if !inside => fitting_width(area, &footprint, width),
                _ => width,
            };
            let next = fit.min(width) - self.config.shrink_margin_px;
            if next < self.config.min_width_px {
                break;
            }
            max_width = next;
        }

        Ok(VariantSearch {
            placement: None,
            fallback,
        })
    }

    fn collides(&self, footprint: &MultiPolygon<f64>) -> bool {
        self.external.collides(footprint) || self.placed.collides(footprint)
    }

    fn occupy(
        &mut self,
        key: K,
        anchor: Point<f64>,
        placement: Placement,
        footprint: MultiPolygon<f64>,
        from_cache: bool,
    ) -> PlacedLabel<K> {
        let bounds = footprint
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(anchor.0, anchor.0));
        self.placed.insert(footprint);

        PlacedLabel {
            key,
            anchor,
            bounds,
            width: placement.width,
            height: placement.height,
            content: placement.content,
            variant: placement.variant,
            from_cache,
        }
    }
}

/// Areas first, smaller before larger, then points and lines. Stable, so
/// equal candidates keep their input order unless `tie_break` decides.
pub fn order_candidates<K>(
    candidates: Vec<Candidate<K>>,
    tie_break: Option<&dyn Fn(&Candidate<K>, &Candidate<K>) -> Ordering>,
) -> Vec<Candidate<K>> {
    let mut keyed: Vec<(bool, f64, Candidate<K>)> = candidates
        .into_iter()
        .map(|c| (!c.shape.is_area(), c.shape.area(), c))
        .collect();

    keyed.sort_by(|(a_point, a_area, a), (b_point, b_area, b)| {
        a_point
            .cmp(b_point)
            .then_with(|| a_area.total_cmp(b_area))
            .then_with(|| tie_break.map_or(Ordering::Equal, |tie| tie(a, b)))
    });
    keyed.into_iter().map(|(_, _, c)| c).collect()
}

/// Points anchor at themselves, areas at their pole of inaccessibility.
fn anchor_of(shape: &Shape, area: Option<&MultiPolygon<f64>>, precision: f64) -> Option<Point<f64>> {
    match (shape, area) {
        (Shape::Point(p), _) => Some(*p),
        (_, Some(area)) => pole_of_inaccessibility(area, precision),
        _ => shape.centroid(),
    }
}

/// Rectangles shifted so their common bounds are centred on the origin.
fn centred(measured: &Measured, bounds: Rect<f64>) -> LabelRects {
    let center = bounds.center();
    measured
        .rects
        .iter()
        .map(|r| Rect::new(r.min() - center, r.max() - center))
        .collect()
}

/// Label footprint in map units around `anchor`.
fn footprint(rects: &LabelRects, anchor: Point<f64>, ppu: f64) -> MultiPolygon<f64> {
    let to_map = |c: Coord<f64>| Coord {
        x: anchor.x() + c.x / ppu,
        y: anchor.y() + c.y / ppu,
    };
    let parts: Vec<MultiPolygon<f64>> = rects
        .iter()
        .map(|r| MultiPolygon::new(vec![Rect::new(to_map(r.min()), to_map(r.max())).to_polygon()]))
        .collect();

    match parts.as_slice() {
        [only] => only.clone(),
        _ => union_all(parts.iter()),
    }
}

/// Width in pixels of a footprint of the same height covering only the part
/// of `footprint` that overlaps `area`.
fn fitting_width(area: &MultiPolygon<f64>, footprint: &MultiPolygon<f64>, width: f64) -> f64 {
    let total = footprint.unsigned_area();
    if total <= 0.0 {
        return 0.0;
    }
    width * intersection(area, footprint).unsigned_area() / total
}
