// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged geometry representation shared by the topology and label engines.
//!
//! Every decision point that depends on the geometry kind matches on [`Shape`]
//! exhaustively, so adding a variant forces each consumer to handle it.

use geo::{
    Area, BoundingRect, Centroid, Geometry, Intersects, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Rect,
};
use serde::{Deserialize, Serialize};

use crate::bool2d::envelopes_intersect;
use crate::error::{Error, Result};

/// A feature shape: point, line, polygon, or a multi-variant of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "geometry")]
pub enum Shape {
    Point(Point<f64>),
    Line(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPoint(MultiPoint<f64>),
    MultiLine(MultiLineString<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    /// Returns `true` for polygon-ish shapes.
    pub fn is_area(&self) -> bool {
        match self {
            Shape::Polygon(_) | Shape::MultiPolygon(_) => true,
            Shape::Point(_) | Shape::Line(_) | Shape::MultiPoint(_) | Shape::MultiLine(_) => false,
        }
    }

    /// Returns `true` for point-ish shapes.
    pub fn is_point(&self) -> bool {
        matches!(self, Shape::Point(_) | Shape::MultiPoint(_))
    }

    /// Unsigned area; zero for points and lines.
    pub fn area(&self) -> f64 {
        match self {
            Shape::Polygon(p) => p.unsigned_area(),
            Shape::MultiPolygon(mp) => mp.unsigned_area(),
            Shape::Point(_) | Shape::Line(_) | Shape::MultiPoint(_) | Shape::MultiLine(_) => 0.0,
        }
    }

    /// Axis-aligned envelope, `None` for empty geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Shape::Point(p) => Some(p.bounding_rect()),
            Shape::Line(ls) => ls.bounding_rect(),
            Shape::Polygon(p) => p.bounding_rect(),
            Shape::MultiPoint(mp) => mp.bounding_rect(),
            Shape::MultiLine(ml) => ml.bounding_rect(),
            Shape::MultiPolygon(mp) => mp.bounding_rect(),
        }
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Shape::Point(p) => Some(*p),
            Shape::Line(ls) => ls.centroid(),
            Shape::Polygon(p) => p.centroid(),
            Shape::MultiPoint(mp) => mp.centroid(),
            Shape::MultiLine(ml) => ml.centroid(),
            Shape::MultiPolygon(mp) => mp.centroid(),
        }
    }

    /// The area covered by this shape, or `None` if it is not polygon-ish.
    pub fn to_multi_polygon(&self) -> Option<MultiPolygon<f64>> {
        match self {
            Shape::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
            Shape::MultiPolygon(mp) => Some(mp.clone()),
            Shape::Point(_) | Shape::Line(_) | Shape::MultiPoint(_) | Shape::MultiLine(_) => None,
        }
    }

    /// Exterior and interior rings of every polygon in the shape.
    pub fn boundary_rings(&self) -> Vec<LineString<f64>> {
        let polygons: Vec<&Polygon<f64>> = match self {
            Shape::Polygon(p) => vec![p],
            Shape::MultiPolygon(mp) => mp.0.iter().collect(),
            Shape::Point(_) | Shape::Line(_) | Shape::MultiPoint(_) | Shape::MultiLine(_) => {
                return Vec::new()
            }
        };

        polygons
            .into_iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
            .filter(|ring| ring.0.len() >= 2)
            .cloned()
            .collect()
    }

    /// Line strings of line-ish shapes.
    pub fn line_strings(&self) -> Vec<LineString<f64>> {
        match self {
            Shape::Line(ls) => vec![ls.clone()],
            Shape::MultiLine(ml) => ml.0.clone(),
            Shape::Point(_) | Shape::Polygon(_) | Shape::MultiPoint(_) | Shape::MultiPolygon(_) => {
                Vec::new()
            }
        }
    }

    /// Envelope test followed by an exact intersection test against an area.
    pub fn intersects_region(&self, region: &MultiPolygon<f64>) -> bool {
        let (Some(a), Some(b)) = (self.bounding_rect(), region.bounding_rect()) else {
            return false;
        };
        if !envelopes_intersect(&a, &b) {
            return false;
        }

        match self {
            Shape::Point(p) => region.intersects(p),
            Shape::Line(ls) => region.intersects(ls),
            Shape::Polygon(p) => region.intersects(p),
            Shape::MultiPoint(mp) => region.intersects(mp),
            Shape::MultiLine(ml) => region.intersects(ml),
            Shape::MultiPolygon(mp) => region.intersects(mp),
        }
    }
}

impl TryFrom<Geometry<f64>> for Shape {
    type Error = Error;

    fn try_from(geometry: Geometry<f64>) -> Result<Self> {
        let shape = match geometry {
            Geometry::Point(p) => Shape::Point(p),
            Geometry::Line(l) => Shape::Line(LineString::new(vec![l.start, l.end])),
            Geometry::LineString(ls) => Shape::Line(ls),
            Geometry::Polygon(p) => Shape::Polygon(p),
            Geometry::MultiPoint(mp) => Shape::MultiPoint(mp),
            Geometry::MultiLineString(ml) => Shape::MultiLine(ml),
            Geometry::MultiPolygon(mp) => Shape::MultiPolygon(mp),
            Geometry::Rect(r) => Shape::Polygon(r.to_polygon()),
            Geometry::Triangle(t) => Shape::Polygon(t.to_polygon()),
            Geometry::GeometryCollection(_) => {
                return Err(Error::InvalidShape(
                    "geometry collections are not supported".to_string(),
                ))
            }
        };

        if shape.bounding_rect().is_none() {
            return Err(Error::EmptyGeometry(format!("{shape:?}")));
        }
        Ok(shape)
    }
}

impl From<Point<f64>> for Shape {
    fn from(p: Point<f64>) -> Self {
        Shape::Point(p)
    }
}

impl From<LineString<f64>> for Shape {
    fn from(ls: LineString<f64>) -> Self {
        Shape::Line(ls)
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(p: Polygon<f64>) -> Self {
        Shape::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(mp: MultiPolygon<f64>) -> Self {
        Shape::MultiPolygon(mp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect_polygon;
    use approx::assert_relative_eq;
    use geo::{coord, point};

    #[test]
    fn area_only_for_polygons() {
        let square: Shape = rect_polygon(0.0, 0.0, 2.0, 3.0).into();
        assert!(square.is_area());
        assert_relative_eq!(square.area(), 6.0);

        let p: Shape = point!(x: 1.0, y: 1.0).into();
        assert!(!p.is_area());
        assert!(p.is_point());
        assert_eq!(p.area(), 0.0);
        assert!(p.to_multi_polygon().is_none());
    }

    #[test]
    fn boundary_rings_include_holes() {
        let outer = rect_polygon(0.0, 0.0, 10.0, 10.0);
        let hole = rect_polygon(4.0, 4.0, 6.0, 6.0);
        let with_hole = Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);
        let shape = Shape::Polygon(with_hole);

        assert_eq!(shape.boundary_rings().len(), 2);
        assert!(shape.line_strings().is_empty());
    }

    #[test]
    fn intersects_region_uses_exact_test() {
        let region = MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 4.0, 4.0)]);
        let inside: Shape = point!(x: 1.0, y: 1.0).into();
        let outside: Shape = point!(x: 8.0, y: 8.0).into();
        let crossing: Shape = LineString::new(vec![
            coord! { x: -1.0, y: 2.0 },
            coord! { x: 5.0, y: 2.0 },
        ])
        .into();

        assert!(inside.intersects_region(&region));
        assert!(!outside.intersects_region(&region));
        assert!(crossing.intersects_region(&region));
        assert!(!inside.intersects_region(&MultiPolygon::new(Vec::new())));
    }

    #[test]
    fn converts_from_geo_geometry() {
        let rect = geo::Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let shape = Shape::try_from(Geometry::Rect(rect)).unwrap();
        assert!(shape.is_area());

        let collection = Geometry::GeometryCollection(geo::GeometryCollection::new_from(vec![]));
        assert!(matches!(
            Shape::try_from(collection),
            Err(Error::InvalidShape(_))
        ));

        let empty = Geometry::LineString(LineString::new(Vec::new()));
        assert!(matches!(Shape::try_from(empty), Err(Error::EmptyGeometry(_))));
    }
}
