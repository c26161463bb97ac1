// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Occupied map space, for label collision tests.
//!
//! Uses a grid-based spatial hash: each inserted area is registered in every
//! cell its bounding box covers, so a query only tests areas sharing a cell
//! with it. Areas spanning more than [`MAX_CELLS_PER_AREA`] cells (long wall
//! outlines) are kept in a separate list and tested by envelope first.

use geo::{BoundingRect, MultiPolygon, Rect, Relate};
use indoor_lite_geometry::envelopes_intersect;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Areas covering more cells than this bypass the grid
pub const MAX_CELLS_PER_AREA: i64 = 1024;

#[derive(Debug)]
struct Occupied {
    bounds: Rect<f64>,
    area: MultiPolygon<f64>,
}

#[derive(Debug)]
pub struct Occupancy {
    cell_size: f64,
    grid: FxHashMap<(i64, i64), SmallVec<[u32; 4]>>,
    oversized: Vec<u32>,
    areas: Vec<Occupied>,
}

impl Occupancy {
    /// Creates an empty occupancy set. `cell_size` is in map units.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size.is_finite() && cell_size > 0.0 {
                cell_size
            } else {
                1.0
            },
            grid: FxHashMap::default(),
            oversized: Vec::new(),
            areas: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.oversized.clear();
        self.areas.clear();
    }

    pub fn insert(&mut self, area: MultiPolygon<f64>) {
        let Some(bounds) = area.bounding_rect() else {
            return;
        };
        let index = self.areas.len() as u32;
        let (x0, y0, x1, y1) = self.cell_span(&bounds);

        if (x1 - x0 + 1).saturating_mul(y1 - y0 + 1) > MAX_CELLS_PER_AREA {
            self.oversized.push(index);
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    self.grid.entry((cx, cy)).or_default().push(index);
                }
            }
        }
        self.areas.push(Occupied { bounds, area });
    }

    /// Whether `area` overlaps any occupied area. Touching boundaries do
    /// not count.
    pub fn collides(&self, area: &MultiPolygon<f64>) -> bool {
        let Some(bounds) = area.bounding_rect() else {
            return false;
        };
        let (x0, y0, x1, y1) = self.cell_span(&bounds);

        let mut tested: FxHashSet<u32> = FxHashSet::default();
        let from_grid = (x0..=x1)
            .flat_map(|cx| (y0..=y1).map(move |cy| (cx, cy)))
            .filter_map(|cell| self.grid.get(&cell))
            .flatten()
            .copied();

        from_grid
            .chain(self.oversized.iter().copied())
            .filter(|index| tested.insert(*index))
            .any(|index| {
                let other = &self.areas[index as usize];
                envelopes_intersect(&other.bounds, &bounds) && overlaps(&other.area, area)
            })
    }

    fn cell_span(&self, bounds: &Rect<f64>) -> (i64, i64, i64, i64) {
        let cell = |v: f64| (v / self.cell_size).floor() as i64;
        (
            cell(bounds.min().x),
            cell(bounds.min().y),
            cell(bounds.max().x),
            cell(bounds.max().y),
        )
    }
}

fn overlaps(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let matrix = a.relate(b);
    matrix.is_intersects() && !matrix.is_touches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoor_lite_geometry::rect_polygon;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![rect_polygon(x, y, x + size, y + size)])
    }

    #[test]
    fn overlapping_areas_collide() {
        let mut occupancy = Occupancy::new(1.0);
        occupancy.insert(square(0.0, 0.0, 2.0));

        assert!(occupancy.collides(&square(1.0, 1.0, 2.0)));
        assert!(!occupancy.collides(&square(5.0, 5.0, 1.0)));
        // Shared edge only
        assert!(!occupancy.collides(&square(2.0, 0.0, 1.0)));
    }

    #[test]
    fn large_areas_bypass_the_grid() {
        let mut occupancy = Occupancy::new(0.1);
        occupancy.insert(square(0.0, 0.0, 100.0));
        assert_eq!(occupancy.oversized.len(), 1);
        assert!(occupancy.grid.is_empty());

        assert!(occupancy.collides(&square(50.0, 50.0, 1.0)));
        assert!(!occupancy.collides(&square(150.0, 50.0, 1.0)));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut occupancy = Occupancy::new(1.0);
        occupancy.insert(square(0.0, 0.0, 1.0));
        occupancy.insert(MultiPolygon::new(Vec::new()));
        assert_eq!(occupancy.len(), 1);

        occupancy.clear();
        assert!(occupancy.is_empty());
        assert!(!occupancy.collides(&square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn hole_does_not_collide() {
        use geo::{LineString, Polygon};
        let ring = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (2.0, 2.0),
                (2.0, 8.0),
                (8.0, 8.0),
                (8.0, 2.0),
                (2.0, 2.0),
            ])],
        );
        let mut occupancy = Occupancy::new(1.0);
        occupancy.insert(MultiPolygon::new(vec![ring]));

        assert!(!occupancy.collides(&square(4.0, 4.0, 2.0)));
        assert!(occupancy.collides(&square(1.0, 4.0, 2.0)));
    }
}
