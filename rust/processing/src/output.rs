// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable snapshot of a frame.

use indoor_lite_labels::PlacementReport;
use indoor_lite_topology::{feature_id, MapItem, Tags};
use serde::Serialize;

use crate::geojson::{GeoFeature, Geometry};
use crate::map::FrameOutput;

/// A placed label keyed by stable feature id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRecord {
    pub id: u64,
    pub anchor: [f64; 2],
    /// `[min_x, min_y, max_x, max_y]` in map units
    pub bounds: [f64; 4],
    pub width: f64,
    pub height: f64,
    pub content: String,
    pub variant: String,
}

/// GeoJSON feature collection of one level: features with their displayed
/// geometry, synthesized walls and walkways, plus placed labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct WallsDocument {
    pub level: i32,
    pub levels: Vec<i32>,
    pub features: Vec<GeoFeature>,
    pub labels: Vec<LabelRecord>,
    pub report: PlacementReport,
}

impl WallsDocument {
    pub fn from_frame(level: i32, frame: &FrameOutput<'_>) -> Self {
        let features = frame.items.iter().map(item_feature).collect();
        let labels = frame
            .labels
            .iter()
            .map(|label| LabelRecord {
                id: feature_id(label.key),
                anchor: [label.anchor.x(), label.anchor.y()],
                bounds: [
                    label.bounds.min().x,
                    label.bounds.min().y,
                    label.bounds.max().x,
                    label.bounds.max().y,
                ],
                width: label.width,
                height: label.height,
                content: label.content.clone(),
                variant: label.variant.clone(),
            })
            .collect();

        Self {
            level,
            levels: frame.levels.clone(),
            features,
            labels,
            report: frame.report,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn item_feature(item: &MapItem<'_>) -> GeoFeature {
    match *item {
        MapItem::Feature {
            key,
            feature,
            display,
            ..
        } => {
            let geometry = match display {
                Some(area) => Geometry::from(area),
                None => Geometry::from(&feature.shape),
            };
            let mut out = GeoFeature::new(geometry, &feature.tags);
            out.properties
                .insert("id".to_string(), serde_json::Value::from(feature_id(key)));
            out
        }
        MapItem::Wall { area, .. } => {
            let mut tags = Tags::default();
            tags.insert("indoor".to_string(), "wall".to_string());
            tags.insert("generated".to_string(), "yes".to_string());
            GeoFeature::new(Geometry::from(area), &tags)
        }
        MapItem::Walkway { walkway, .. } => {
            GeoFeature::new(Geometry::from(&walkway.line), &walkway.tags())
        }
    }
}
