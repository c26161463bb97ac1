// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration. Distances are in map units.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for level routing, wall synthesis and rebuild scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wall thickness on the building perimeter
    pub outer_wall_width: f64,
    /// Wall thickness between adjacent rooms
    pub inner_wall_width: f64,
    /// Door width when a door has no usable `width` tag
    pub default_door_width: f64,
    /// Buffer applied to the wall skeleton pieces a door interrupts
    pub door_cut_margin: f64,
    /// Segments per quarter circle for discs
    pub quadrant_segments: u32,
    /// Max distance from an entrance to a room ring for a walkway
    pub walkway_search_distance: f64,
    /// Radius of the probe disc intersected with the room ring
    pub walkway_probe_radius: f64,
    /// Length of a synthetic entrance walkway
    pub walkway_length: f64,
    /// Soft time budget of one rebuild pass
    pub rebuild_budget: Duration,
    /// Delay before a deferred pass continues
    pub retry_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outer_wall_width: 0.4,
            inner_wall_width: 0.2,
            default_door_width: 1.2,
            door_cut_margin: 0.5,
            quadrant_segments: 8,
            walkway_search_distance: 1.0,
            walkway_probe_radius: 0.5,
            walkway_length: 1.0,
            rebuild_budget: Duration::from_millis(100),
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl EngineConfig {
    /// Outward offset of the room union that forms the base wall area.
    pub fn perimeter_offset(&self) -> f64 {
        self.outer_wall_width - self.inner_wall_width / 2.0
    }

    /// Half the inner wall width, the per-side thickness of a partition.
    pub fn half_inner(&self) -> f64 {
        self.inner_wall_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_offsets() {
        let config = EngineConfig::default();
        assert_relative_eq!(config.perimeter_offset(), 0.3);
        assert_relative_eq!(config.half_inner(), 0.1);
        assert_eq!(config.rebuild_budget, Duration::from_millis(100));
    }
}
