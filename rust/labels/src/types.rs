// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inputs and outputs of a placement pass.

use geo::{Point, Rect};
use indoor_lite_geometry::Shape;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::MeasureError;

/// Label rectangles in pixels, local to the label.
pub type LabelRects = SmallVec<[Rect<f64>; 2]>;

/// A feature asking for a label.
#[derive(Debug, Clone)]
pub struct Candidate<K> {
    pub key: K,
    /// Bumped when the feature's tags change
    pub feature_revision: u64,
    /// Bumped when the feature's geometry changes
    pub geometry_revision: u64,
    /// Geometry the label must fit in, in map units
    pub shape: Shape,
    /// First variant of the fallback chain
    pub default_variant: String,
}

impl<K> Candidate<K> {
    pub fn new(key: K, shape: Shape, default_variant: impl Into<String>) -> Self {
        Self {
            key,
            feature_revision: 0,
            geometry_revision: 0,
            shape,
            default_variant: default_variant.into(),
        }
    }

    pub fn with_revisions(mut self, feature_revision: u64, geometry_revision: u64) -> Self {
        self.feature_revision = feature_revision;
        self.geometry_revision = geometry_revision;
        self
    }
}

/// Content measured for one variant at a given maximum width.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measured {
    pub rects: LabelRects,
    /// Rendered content, e.g. the wrapped text
    pub content: String,
    /// Variant to try when this one cannot be placed
    pub fallback: Option<String>,
    /// Allow the content to be wider than the feature geometry
    pub allow_overflow: bool,
}

impl Measured {
    /// Combined bounding box of all rectangles.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.rects.iter().copied().reduce(|a, b| {
            Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
    }

    pub fn width(&self) -> f64 {
        self.bounds().map_or(0.0, |r| r.width())
    }
}

/// Lays out label content for a candidate.
///
/// Implementations own text shaping and icon sizing. An error skips the
/// candidate for this pass only.
pub trait TextMeasurer<K> {
    fn measure(
        &mut self,
        candidate: &Candidate<K>,
        variant: &str,
        max_width: f64,
    ) -> Result<Measured, MeasureError>;
}

impl<K, F> TextMeasurer<K> for F
where
    F: FnMut(&Candidate<K>, &str, f64) -> Result<Measured, MeasureError>,
{
    fn measure(
        &mut self,
        candidate: &Candidate<K>,
        variant: &str,
        max_width: f64,
    ) -> Result<Measured, MeasureError> {
        self(candidate, variant, max_width)
    }
}

/// View parameters of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub zoom: f64,
    pub pixels_per_unit: f64,
}

impl Frame {
    /// Frame for a web-mercator style zoom, with `base` px per unit at zoom 0.
    pub fn at_zoom(zoom: f64, base: f64) -> Self {
        Self {
            zoom,
            pixels_per_unit: base * zoom.exp2(),
        }
    }
}

/// A label that made it onto the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLabel<K> {
    pub key: K,
    pub anchor: Point<f64>,
    /// Footprint bounds in map units
    pub bounds: Rect<f64>,
    /// Size in pixels
    pub width: f64,
    pub height: f64,
    pub content: String,
    pub variant: String,
    pub from_cache: bool,
}

/// Per-pass counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementReport {
    pub placed: usize,
    /// Candidates with no label this pass, fresh or cached
    pub no_fit: usize,
    /// Candidates skipped after a measurement error
    pub failed: usize,
}

/// Result of one placement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPass<K> {
    pub labels: Vec<PlacedLabel<K>>,
    pub report: PlacementReport,
}
