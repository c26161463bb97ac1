// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Indoor-Lite Topology
//!
//! Level routing and synthetic wall generation for indoor maps.
//!
//! Features are owned by a slot-map [`FeatureStore`] and routed into
//! [`Level`]s: one level per spatially connected cluster of features sharing a
//! level number. Levels whose regions meet are merged, never split again.
//! Each dirty level can be rebuilt into a wall polygon, wall-clipped display
//! geometry for its rooms and short walkways at its entrances.
//! [`RebuildScheduler`] spreads those rebuilds across frames under a time
//! budget.
//!
//! ```no_run
//! use indoor_lite_geometry::rect_polygon;
//! use indoor_lite_topology::{EngineConfig, Feature, TopologyEngine};
//!
//! let mut engine = TopologyEngine::new(EngineConfig::default());
//! engine.add_feature(Feature::with_tags(
//!     rect_polygon(0.0, 0.0, 5.0, 5.0).into(),
//!     [("indoor", "room"), ("level", "0")],
//! ));
//! engine.rebuild_all().unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod keys;
pub mod level;
pub mod level_range;
pub mod scheduler;
pub mod walkways;
pub mod walls;

pub use config::EngineConfig;
pub use engine::{MapItem, TopologyEngine};
pub use error::{Error, Result};
pub use feature::{Feature, FeatureKind, FeatureStore, Tags};
pub use keys::{feature_id, FeatureKey, LevelKey};
pub use level::{Level, Walkway};
pub use level_range::{feature_levels, parse_levels};
pub use scheduler::{Clock, PassOutcome, RebuildScheduler, SystemClock};
pub use walls::{synthesize_walls, WallSynthesis};
