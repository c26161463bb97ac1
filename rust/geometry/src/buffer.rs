// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buffering (offsetting) with explicit cap and join styles.
//!
//! Positive distances grow a shape, negative distances erode areas. Line
//! buffers honour the end-cap style; area buffers only use the join style.
//! Point buffers are built as discs with a configurable number of segments
//! per quadrant so that the vertex count stays predictable.

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap, LineJoin};
use geo::{Coord, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::bool2d::union_all;
use crate::shape::Shape;

/// Corners sharper than this angle (radians) are bevelled instead of mitred.
/// Right angles and anything wider always get a full mitre.
pub const MITRE_MIN_ANGLE: f64 = 0.1;

/// Default number of segments used to approximate a quarter circle
pub const DEFAULT_QUADRANT_SEGMENTS: u32 = 8;

/// End-cap style for line buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cap {
    /// Cut off exactly at the line end
    Flat,
    /// Extend past the line end by the buffer distance
    Square,
}

/// Corner style for buffered outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Join {
    Mitre,
    Bevel,
}

/// A buffer distance with its cap and join style
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferSpec {
    pub distance: f64,
    pub cap: Cap,
    pub join: Join,
}

impl BufferSpec {
    /// Flat caps and mitred joins.
    pub fn flat(distance: f64) -> Self {
        Self {
            distance,
            cap: Cap::Flat,
            join: Join::Mitre,
        }
    }

    /// Square caps and mitred joins.
    pub fn square(distance: f64) -> Self {
        Self {
            distance,
            cap: Cap::Square,
            join: Join::Mitre,
        }
    }

    fn style(&self) -> BufferStyle<f64> {
        let cap = match self.cap {
            Cap::Flat => LineCap::Butt,
            Cap::Square => LineCap::Square,
        };
        let join = match self.join {
            Join::Mitre => LineJoin::Miter(MITRE_MIN_ANGLE),
            Join::Bevel => LineJoin::Bevel,
        };
        BufferStyle::new(self.distance).line_cap(cap).line_join(join)
    }
}

/// Buffer an area. A zero distance returns the input unchanged.
pub fn buffer_area(area: &MultiPolygon<f64>, spec: BufferSpec) -> MultiPolygon<f64> {
    if area.0.is_empty() || spec.distance == 0.0 {
        return area.clone();
    }
    area.buffer_with_style(spec.style())
}

/// Buffer line work into an area. Non-positive distances yield nothing.
pub fn buffer_lines(lines: &MultiLineString<f64>, spec: BufferSpec) -> MultiPolygon<f64> {
    if lines.0.is_empty() || spec.distance <= 0.0 {
        return MultiPolygon::new(Vec::new());
    }
    lines.buffer_with_style(spec.style())
}

/// Buffer any shape into an area.
///
/// Points become discs of `spec.distance` radius; negative distances only
/// make sense for areas and yield nothing for points and lines.
pub fn buffer_shape(shape: &Shape, spec: BufferSpec) -> MultiPolygon<f64> {
    match shape {
        Shape::Polygon(p) => buffer_area(&MultiPolygon::new(vec![p.clone()]), spec),
        Shape::MultiPolygon(mp) => buffer_area(mp, spec),
        Shape::Line(ls) => buffer_lines(&MultiLineString::new(vec![ls.clone()]), spec),
        Shape::MultiLine(ml) => buffer_lines(ml, spec),
        Shape::Point(p) => {
            if spec.distance <= 0.0 {
                return MultiPolygon::new(Vec::new());
            }
            MultiPolygon::new(vec![disc(*p, spec.distance, DEFAULT_QUADRANT_SEGMENTS)])
        }
        Shape::MultiPoint(mp) => {
            if spec.distance <= 0.0 {
                return MultiPolygon::new(Vec::new());
            }
            let discs: Vec<MultiPolygon<f64>> = mp
                .0
                .iter()
                .map(|p| {
                    MultiPolygon::new(vec![disc(*p, spec.distance, DEFAULT_QUADRANT_SEGMENTS)])
                })
                .collect();
            union_all(discs.iter())
        }
    }
}

/// Regular polygon approximating a circle, `4 * quadrant_segments` vertices.
pub fn disc(center: Point<f64>, radius: f64, quadrant_segments: u32) -> Polygon<f64> {
    let segments = 4 * quadrant_segments.max(1);
    let step = std::f64::consts::TAU / segments as f64;
    let coords: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let angle = step * i as f64;
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(coords), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool2d::rect_polygon;
    use approx::assert_relative_eq;
    use geo::{coord, point, Area, BoundingRect};

    #[test]
    fn disc_vertex_count_and_extent() {
        let d = disc(point!(x: 1.0, y: 2.0), 3.0, 8);
        // Closed ring repeats the first vertex
        assert_eq!(d.exterior().0.len(), 33);

        let bounds = d.bounding_rect().unwrap();
        assert_relative_eq!(bounds.max().x, 4.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.min().y, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn grow_and_erode_square() {
        let square = MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 10.0, 10.0)]);

        let grown = buffer_area(&square, BufferSpec::flat(1.0));
        assert_relative_eq!(grown.unsigned_area(), 144.0, epsilon = 1e-6);
        let bounds = grown.bounding_rect().unwrap();
        assert_relative_eq!(bounds.min().x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max().y, 11.0, epsilon = 1e-9);

        let eroded = buffer_area(&square, BufferSpec::flat(-1.0));
        assert_relative_eq!(eroded.unsigned_area(), 64.0, epsilon = 1e-3);
    }

    #[test]
    fn right_angle_corners_are_mitred() {
        let room = MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 10.0, 5.0)]);
        let grown = buffer_area(&room, BufferSpec::flat(0.3));
        // 10.6 x 5.6, no chamfered corners
        assert_relative_eq!(grown.unsigned_area(), 59.36, epsilon = 1e-6);
    }

    #[test]
    fn square_caps_extend_line_ends() {
        let line = MultiLineString::new(vec![LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 4.0, y: 0.0 },
        ])]);

        let square = buffer_lines(&line, BufferSpec::square(0.5));
        let bounds = square.bounding_rect().unwrap();
        assert_relative_eq!(bounds.min().x, -0.5, epsilon = 1e-6);
        assert_relative_eq!(bounds.max().x, 4.5, epsilon = 1e-6);
        assert_relative_eq!(square.unsigned_area(), 5.0, epsilon = 1e-3);

        let flat = buffer_lines(&line, BufferSpec::flat(0.5));
        assert_relative_eq!(flat.unsigned_area(), 4.0, epsilon = 1e-3);
    }

    #[test]
    fn point_buffer_is_a_disc() {
        let shape = Shape::Point(point!(x: 0.0, y: 0.0));
        let area = buffer_shape(&shape, BufferSpec::flat(1.0));
        assert_eq!(area.0.len(), 1);
        assert!(area.unsigned_area() > 3.0 && area.unsigned_area() < std::f64::consts::PI);

        assert!(buffer_shape(&shape, BufferSpec::flat(-1.0)).0.is_empty());
    }
}
