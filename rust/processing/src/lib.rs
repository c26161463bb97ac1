// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indoor map pipeline shared by the `indoor-map` tool and embedders.
//!
//! Loads GeoJSON features into the topology engine, runs budgeted wall
//! rebuilds for the view and places labels against the walls each frame.

pub mod config;
pub mod error;
pub mod geojson;
pub mod map;
pub mod measure;
pub mod output;

pub use config::Config;
pub use error::{Error, Result};
pub use geojson::{FeatureCollection, GeoFeature, Geometry};
pub use map::{FrameOutput, IndoorMap, View};
pub use measure::{FixedAdvance, TagMeasurer, TextLayout, LABEL_TAGS};
pub use output::{LabelRecord, WallsDocument};
