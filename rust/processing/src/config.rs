// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use indoor_lite_labels::{Frame, LabelConfig};
use indoor_lite_topology::EngineConfig;

/// Pixels per map unit (meter) at zoom 0 for 256px web-mercator tiles
pub const WEB_MERCATOR_BASE: f64 = 256.0 / 40_075_016.686;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub engine: EngineConfig,
    pub labels: LabelConfig,
    /// Zoom used when the caller does not give one
    pub zoom: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            labels: LabelConfig::default(),
            zoom: 19.0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str, default| parse_or(lookup(name), default);
        let millis = |name: &str, default: Duration| {
            Duration::from_millis(parse_or(lookup(name), default.as_millis() as u64))
        };

        Self {
            engine: EngineConfig {
                outer_wall_width: var("INDOOR_OUTER_WALL_WIDTH", defaults.engine.outer_wall_width),
                inner_wall_width: var("INDOOR_INNER_WALL_WIDTH", defaults.engine.inner_wall_width),
                default_door_width: var("INDOOR_DOOR_WIDTH", defaults.engine.default_door_width),
                rebuild_budget: millis("INDOOR_REBUILD_BUDGET_MS", defaults.engine.rebuild_budget),
                retry_delay: millis("INDOOR_RETRY_DELAY_MS", defaults.engine.retry_delay),
                ..defaults.engine
            },
            labels: LabelConfig {
                cache_capacity: parse_or(lookup("INDOOR_LABEL_CACHE"), defaults.labels.cache_capacity),
                ..defaults.labels
            },
            zoom: var("INDOOR_ZOOM", defaults.zoom),
        }
    }

    /// Label frame at `zoom`.
    pub fn frame(&self, zoom: f64) -> Frame {
        Frame::at_zoom(zoom, WEB_MERCATOR_BASE)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
