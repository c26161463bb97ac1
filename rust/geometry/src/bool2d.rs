// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Overlay
//!
//! Union, difference and intersection of area geometry. Pairwise operations go
//! through `geo`'s `BooleanOps`; n-ary unions of many contours (level regions,
//! door discs) are folded into a single `i_overlay` pass, which is much cheaper
//! than a left-to-right chain of pairwise unions.

use geo::{
    BooleanOps, BoundingRect, Coord, LineString, MultiLineString, MultiPolygon, Polygon, Rect,
    Relate,
};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

/// Minimum area threshold - contours smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Union of two areas.
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() {
        return b.clone();
    }
    if b.0.is_empty() {
        return a.clone();
    }
    a.union(b)
}

/// `a` minus `b`.
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return a.clone();
    }
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) if !envelopes_intersect(&ra, &rb) => a.clone(),
        _ => a.difference(b),
    }
}

/// Intersection of two areas.
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    a.intersection(b)
}

/// Union any number of areas in one overlay pass.
///
/// Contours are re-oriented (outer counter-clockwise, holes clockwise) and
/// evaluated with the non-zero fill rule, so overlapping inputs merge instead
/// of cancelling out.
pub fn union_all<'a, I>(areas: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    let mut subject: Vec<Vec<[f64; 2]>> = Vec::new();
    for area in areas {
        for polygon in &area.0 {
            polygon_to_paths(polygon, &mut subject);
        }
    }

    if subject.is_empty() {
        return MultiPolygon::new(Vec::new());
    }

    let clip: Vec<Vec<[f64; 2]>> = Vec::new();
    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);
    shapes_to_multi_polygon(&result)
}

/// Portions of `lines` lying inside `area`.
pub fn clip_lines(area: &MultiPolygon<f64>, lines: &MultiLineString<f64>) -> MultiLineString<f64> {
    if area.0.is_empty() || lines.0.is_empty() {
        return MultiLineString::new(Vec::new());
    }
    area.clip(lines, false)
}

/// Returns `true` if `inner` lies entirely inside `outer` (boundary contact allowed).
pub fn contains_region(outer: &MultiPolygon<f64>, inner: &MultiPolygon<f64>) -> bool {
    if outer.0.is_empty() || inner.0.is_empty() {
        return false;
    }
    match (outer.bounding_rect(), inner.bounding_rect()) {
        (Some(ro), Some(ri)) if !rect_contains(&ro, &ri) => false,
        _ => outer.relate(inner).is_contains(),
    }
}

/// Check if two envelopes overlap (touching counts)
pub fn envelopes_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && a.max().x >= b.min().x
        && a.min().y <= b.max().y
        && a.max().y >= b.min().y
}

/// Check if envelope `inner` lies within `outer`
pub fn rect_contains(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}

/// Axis-aligned rectangle polygon.
pub fn rect_polygon(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }).to_polygon()
}

/// Compute the signed area of a closed path
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(path: &[[f64; 2]]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }

    let n = path.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += path[i][0] * path[j][1];
        area -= path[j][0] * path[i][1];
    }

    area * 0.5
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Append a polygon's rings to `paths` in i_overlay format
fn polygon_to_paths(polygon: &Polygon<f64>, paths: &mut Vec<Vec<[f64; 2]>>) {
    let outer = ring_to_path(polygon.exterior());
    if compute_signed_area(&outer).abs() <= MIN_AREA_THRESHOLD {
        return;
    }
    paths.push(oriented(outer, true));

    for hole in polygon.interiors() {
        let hole = ring_to_path(hole);
        if compute_signed_area(&hole).abs() > MIN_AREA_THRESHOLD {
            paths.push(oriented(hole, false));
        }
    }
}

/// Convert a ring to an open path (i_overlay does not repeat the first point)
fn ring_to_path(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut path: Vec<[f64; 2]> = ring.0.iter().map(|c| [c.x, c.y]).collect();
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    path
}

fn oriented(mut path: Vec<[f64; 2]>, ccw: bool) -> Vec<[f64; 2]> {
    let is_ccw = compute_signed_area(&path) > 0.0;
    if is_ccw != ccw {
        path.reverse();
    }
    path
}

/// Convert i_overlay result shapes back to geo polygons
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_multi_polygon(shapes: &[Vec<Vec<[f64; 2]>>]) -> MultiPolygon<f64> {
    let polygons = shapes
        .iter()
        .filter_map(|shape| {
            let (outer, holes) = shape.split_first()?;
            if compute_signed_area(outer).abs() <= MIN_AREA_THRESHOLD {
                return None;
            }
            let interiors = holes
                .iter()
                .filter(|h| compute_signed_area(h).abs() > MIN_AREA_THRESHOLD)
                .map(|h| path_to_ring(h))
                .collect();
            Some(Polygon::new(path_to_ring(outer), interiors))
        })
        .collect();

    MultiPolygon::new(polygons)
}

fn path_to_ring(path: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(
        path.iter()
            .map(|p| Coord { x: p[0], y: p[1] })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{coord, Area};

    fn mp(p: Polygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![p])
    }

    #[test]
    fn test_compute_signed_area_orientation() {
        let ccw = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert_relative_eq!(compute_signed_area(&ccw), 1.0);
        assert_relative_eq!(compute_signed_area(&cw), -1.0);
    }

    #[test]
    fn test_union_all_merges_overlaps() {
        let a = mp(rect_polygon(0.0, 0.0, 2.0, 2.0));
        let b = mp(rect_polygon(1.0, 1.0, 3.0, 3.0));
        let c = mp(rect_polygon(10.0, 10.0, 11.0, 11.0));

        let result = union_all([&a, &b, &c]);

        assert_eq!(result.0.len(), 2);
        assert_relative_eq!(result.unsigned_area(), 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_union_all_keeps_holes() {
        let outer = rect_polygon(0.0, 0.0, 10.0, 10.0);
        let hole = rect_polygon(4.0, 4.0, 6.0, 6.0);
        let ring = mp(Polygon::new(
            outer.exterior().clone(),
            vec![hole.exterior().clone()],
        ));

        let result = union_all([&ring]);
        assert_relative_eq!(result.unsigned_area(), 96.0, epsilon = 1e-6);
    }

    #[test]
    fn test_union_all_empty() {
        let result = union_all(std::iter::empty());
        assert!(result.0.is_empty());
    }

    #[test]
    fn test_difference_and_intersection() {
        let a = mp(rect_polygon(0.0, 0.0, 10.0, 10.0));
        let b = mp(rect_polygon(4.0, 4.0, 6.0, 6.0));

        assert_relative_eq!(difference(&a, &b).unsigned_area(), 96.0, epsilon = 1e-6);
        assert_relative_eq!(intersection(&a, &b).unsigned_area(), 4.0, epsilon = 1e-6);

        let far = mp(rect_polygon(20.0, 20.0, 21.0, 21.0));
        assert_eq!(difference(&a, &far), a);
        assert!(intersection(&a, &far).0.is_empty());
    }

    #[test]
    fn test_clip_lines_inside_area() {
        let area = mp(rect_polygon(0.0, 0.0, 2.0, 2.0));
        let line = MultiLineString::new(vec![LineString::new(vec![
            coord! { x: -5.0, y: 1.0 },
            coord! { x: 5.0, y: 1.0 },
        ])]);

        let clipped = clip_lines(&area, &line);
        assert_eq!(clipped.0.len(), 1);
        let xs: Vec<f64> = clipped.0[0].0.iter().map(|c| c.x).collect();
        assert!(xs.iter().all(|x| (-1e-9..=2.0 + 1e-9).contains(x)));
    }

    #[test]
    fn test_contains_region() {
        let outer = mp(rect_polygon(0.0, 0.0, 10.0, 10.0));
        let inner = mp(rect_polygon(1.0, 1.0, 3.0, 3.0));
        let straddling = mp(rect_polygon(8.0, 8.0, 12.0, 12.0));

        assert!(contains_region(&outer, &inner));
        assert!(!contains_region(&outer, &straddling));
        assert!(!contains_region(&inner, &outer));
    }

    #[test]
    fn test_envelopes_intersect() {
        let a = rect_polygon(0.0, 0.0, 10.0, 10.0).bounding_rect().unwrap();
        let b = rect_polygon(5.0, 5.0, 15.0, 15.0).bounding_rect().unwrap();
        let c = rect_polygon(20.0, 20.0, 30.0, 30.0).bounding_rect().unwrap();

        assert!(envelopes_intersect(&a, &b));
        assert!(!envelopes_intersect(&a, &c));
    }
}
