// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indoor-Lite Geometry
//!
//! Thin kernel facade over `geo` and `i_overlay`: a tagged [`Shape`] type,
//! boolean overlay, styled buffering, discs and pole-of-inaccessibility
//! queries. The topology and label crates only talk to geometry through
//! this crate.

pub mod bool2d;
pub mod buffer;
pub mod error;
pub mod pole;
pub mod shape;

// Re-export geo types for convenience
pub use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};

pub use bool2d::{
    clip_lines, contains_region, difference, envelopes_intersect, intersection, rect_contains,
    rect_polygon, union, union_all,
};
pub use buffer::{buffer_area, buffer_lines, buffer_shape, disc, BufferSpec, Cap, Join};
pub use error::{Error, Result};
pub use pole::{distance_to_ring, pole_of_inaccessibility};
pub use shape::Shape;

/// An empty area.
pub fn empty_area() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}
