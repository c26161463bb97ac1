// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pole of inaccessibility: the interior point farthest from the boundary.
//!
//! Grid-cell search with a priority queue ordered by the best distance a cell
//! could still contain. Cells that cannot beat the current best by more than
//! `precision` are discarded. Used as the label anchor for rooms, where the
//! centroid of a concave outline can fall outside the room.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Area, BoundingRect, Centroid, Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use nalgebra::Vector2;

/// Upper bound on cells examined, keeps pathological inputs bounded
const MAX_CELLS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Cell {
    center: Vector2<f64>,
    half: f64,
    /// Signed distance from the center to the boundary (negative outside)
    distance: f64,
    /// Best distance any point in this cell could reach
    potential: f64,
}

impl Cell {
    fn new(center: Vector2<f64>, half: f64, polygon: &Polygon<f64>) -> Self {
        let distance = signed_distance(center, polygon);
        Self {
            center,
            half,
            distance,
            potential: distance + half * std::f64::consts::SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.potential.total_cmp(&other.potential) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.potential.total_cmp(&other.potential)
    }
}

/// Find the pole of inaccessibility of the largest polygon in `area`.
///
/// Returns `None` for empty input. Degenerate (zero-extent) polygons yield
/// their first vertex.
pub fn pole_of_inaccessibility(area: &MultiPolygon<f64>, precision: f64) -> Option<Point<f64>> {
    let polygon = area
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))?;
    polygon_pole(polygon, precision)
}

fn polygon_pole(polygon: &Polygon<f64>, precision: f64) -> Option<Point<f64>> {
    let bounds = polygon.bounding_rect()?;
    let width = bounds.width();
    let height = bounds.height();
    if width.min(height) <= 0.0 {
        return polygon.exterior().0.first().map(|c| Point::from(*c));
    }
    // Thin slivers would otherwise seed width / height cells
    let cell_size = width
        .min(height)
        .max(width.max(height) / (MAX_CELLS as f64).sqrt());
    let precision = precision.max(f64::EPSILON);

    let mut queue = BinaryHeap::new();
    let half = cell_size / 2.0;
    let mut x = bounds.min().x;
    while x < bounds.max().x {
        let mut y = bounds.min().y;
        while y < bounds.max().y {
            queue.push(Cell::new(Vector2::new(x + half, y + half), half, polygon));
            y += cell_size;
        }
        x += cell_size;
    }

    let mut best = match polygon.centroid() {
        Some(c) => Cell::new(Vector2::new(c.x(), c.y()), 0.0, polygon),
        None => Cell::new(Vector2::new(bounds.center().x, bounds.center().y), 0.0, polygon),
    };
    let bbox_cell = Cell::new(
        Vector2::new(bounds.center().x, bounds.center().y),
        0.0,
        polygon,
    );
    if bbox_cell.distance > best.distance {
        best = bbox_cell;
    }

    let mut examined = 0usize;
    while let Some(cell) = queue.pop() {
        examined += 1;
        if cell.distance > best.distance {
            best = cell;
        }
        if cell.potential - best.distance <= precision || examined > MAX_CELLS {
            continue;
        }

        let h = cell.half / 2.0;
        for (dx, dy) in [(-h, -h), (h, -h), (-h, h), (h, h)] {
            queue.push(Cell::new(
                cell.center + Vector2::new(dx, dy),
                h,
                polygon,
            ));
        }
    }

    Some(Point::new(best.center.x, best.center.y))
}

/// Shortest distance from a point to a ring or polyline.
pub fn distance_to_ring(point: Point<f64>, ring: &LineString<f64>) -> f64 {
    let p = Vector2::new(point.x(), point.y());
    match ring.0.as_slice() {
        [] => f64::INFINITY,
        [only] => (p - to_vector(only)).norm(),
        coords => coords
            .windows(2)
            .map(|w| segment_distance(p, to_vector(&w[0]), to_vector(&w[1])))
            .fold(f64::INFINITY, f64::min),
    }
}

fn signed_distance(p: Vector2<f64>, polygon: &Polygon<f64>) -> f64 {
    let point = Point::new(p.x, p.y);
    let distance = std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(|ring| distance_to_ring(point, ring))
        .fold(f64::INFINITY, f64::min);

    if polygon.contains(&point) {
        distance
    } else {
        -distance
    }
}

fn segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).norm()
}

fn to_vector(c: &Coord<f64>) -> Vector2<f64> {
    Vector2::new(c.x, c.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool2d::rect_polygon;
    use approx::assert_relative_eq;
    use geo::{coord, point, polygon};

    #[test]
    fn square_pole_is_center() {
        let square = MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 10.0, 10.0)]);
        let pole = pole_of_inaccessibility(&square, 0.01).unwrap();
        assert_relative_eq!(pole.x(), 5.0, epsilon = 0.05);
        assert_relative_eq!(pole.y(), 5.0, epsilon = 0.05);
    }

    #[test]
    fn concave_pole_stays_inside() {
        // U-shaped room: centroid falls into the notch
        let u = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 8.0, y: 10.0),
            (x: 8.0, y: 2.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let area = MultiPolygon::new(vec![u.clone()]);
        let pole = pole_of_inaccessibility(&area, 0.01).unwrap();
        assert!(u.contains(&pole));
    }

    #[test]
    fn picks_largest_polygon() {
        let area = MultiPolygon::new(vec![
            rect_polygon(0.0, 0.0, 1.0, 1.0),
            rect_polygon(10.0, 10.0, 20.0, 20.0),
        ]);
        let pole = pole_of_inaccessibility(&area, 0.1).unwrap();
        assert!(pole.x() > 10.0 && pole.y() > 10.0);
    }

    #[test]
    fn thin_sliver_is_bounded() {
        let sliver = MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 100.0, 1e-5)]);
        let started = std::time::Instant::now();
        let pole = pole_of_inaccessibility(&sliver, 0.1).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!((0.0..=100.0).contains(&pole.x()));
        assert!((0.0..=1e-5).contains(&pole.y()));
    }

    #[test]
    fn empty_input_has_no_pole() {
        assert!(pole_of_inaccessibility(&MultiPolygon::new(Vec::new()), 1.0).is_none());
    }

    #[test]
    fn ring_distance() {
        let ring = LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 4.0, y: 0.0 },
        ]);
        assert_relative_eq!(distance_to_ring(point!(x: 2.0, y: 3.0), &ring), 3.0);
        assert_relative_eq!(distance_to_ring(point!(x: 7.0, y: 4.0), &ring), 5.0);
    }
}
