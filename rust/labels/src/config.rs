// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Label placement configuration. Widths and precisions are in pixels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Measure/test rounds per variant
    pub max_iterations: usize,
    /// A variant is abandoned once its width would drop below this
    pub min_width_px: f64,
    /// Taken off the fitted width on every shrink
    pub shrink_margin_px: f64,
    /// Initial width for labels of point features
    pub point_max_width_px: f64,
    /// Cache buckets per integer zoom level
    pub buckets_per_zoom: f64,
    /// Features remembered by the placement cache
    pub cache_capacity: usize,
    /// Cell size of the occupancy grid
    pub grid_cell_size: f64,
    /// Precision of the pole-of-inaccessibility search
    pub pole_precision_px: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            min_width_px: 30.0,
            shrink_margin_px: 2.0,
            point_max_width_px: 200.0,
            buckets_per_zoom: 2.0,
            cache_capacity: 4096,
            grid_cell_size: 8.0,
            pole_precision_px: 1.0,
        }
    }
}

impl LabelConfig {
    /// Cache bucket of a continuous zoom level.
    pub fn zoom_bucket(&self, zoom: f64) -> i32 {
        (zoom * self.buckets_per_zoom).floor() as i32
    }
}
