// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Indoor-Lite Labels
//!
//! Collision-aware label placement. A [`LabelEngine`] takes the labelable
//! features of a frame as [`Candidate`]s, asks a [`TextMeasurer`] for the
//! label content at a given width, and fits each label inside its feature
//! without overlapping other labels or externally occupied space such as
//! walls. Outcomes are cached per feature and zoom bucket.

pub mod cache;
pub mod config;
pub mod error;
pub mod occupancy;
pub mod placer;
pub mod types;

pub use cache::{CacheEntry, CachedPlacement, Placement, PlacementCache};
pub use config::LabelConfig;
pub use error::{Error, MeasureError, Result};
pub use occupancy::Occupancy;
pub use placer::{order_candidates, LabelEngine, TieBreak};
pub use types::{
    Candidate, Frame, LabelRects, Measured, PlacedLabel, PlacementPass, PlacementReport,
    TextMeasurer,
};
