// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entrance walkways: short footways leading out of a room from each
//! recognized entrance point.

use geo::{Contains, Coord, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use indoor_lite_geometry::{clip_lines, disc, distance_to_ring, Shape};
use nalgebra::Vector2;

use crate::config::EngineConfig;
use crate::feature::FeatureStore;
use crate::keys::FeatureKey;
use crate::level::{Level, Walkway};

/// Generate walkways for the level's unprocessed entrances.
///
/// Every entrance considered is marked processed, whether or not a walkway
/// came out of it. Entrances without a nearby room ring are not retried.
pub(crate) fn generate_entrance_walkways(
    level: &mut Level,
    features: &FeatureStore,
    rooms: &[MultiPolygon<f64>],
    config: &EngineConfig,
) {
    let entrances: Vec<(FeatureKey, Point<f64>)> = level
        .members
        .iter()
        .filter(|key| !level.processed_entrances.contains(key))
        .filter_map(|&key| {
            let feature = features.get(key)?;
            feature.walkway_entrance()?;
            match feature.shape {
                Shape::Point(p) => Some((key, p)),
                _ => None,
            }
        })
        .collect();

    for (key, point) in entrances {
        level.processed_entrances.insert(key);
        match entrance_walkway(point, rooms, config) {
            Some(line) => level.walkways.push(Walkway { entrance: key, line }),
            None => tracing::trace!(?point, "No room ring near entrance"),
        }
    }
}

/// Walkway line for one entrance, from its outer end to the room boundary.
pub fn entrance_walkway(
    point: Point<f64>,
    rooms: &[MultiPolygon<f64>],
    config: &EngineConfig,
) -> Option<LineString<f64>> {
    let probe = MultiPolygon::new(vec![disc(
        point,
        config.walkway_probe_radius,
        config.quadrant_segments,
    )]);

    rooms
        .iter()
        .flat_map(|area| area.0.iter())
        .flat_map(|polygon| rings(polygon).map(move |ring| (polygon, ring)))
        .filter(|(_, ring)| distance_to_ring(point, ring) <= config.walkway_search_distance)
        .find_map(|(polygon, ring)| walkway_across(polygon, ring, &probe, config))
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

fn walkway_across(
    room: &Polygon<f64>,
    ring: &LineString<f64>,
    probe: &MultiPolygon<f64>,
    config: &EngineConfig,
) -> Option<LineString<f64>> {
    let crossing = clip_lines(probe, &MultiLineString::new(vec![ring.clone()]));
    let first = crossing.0.first()?.0.first()?;
    let last = crossing.0.last()?.0.last()?;

    let a = Vector2::new(first.x, first.y);
    let b = Vector2::new(last.x, last.y);
    let chord = b - a;
    if chord.norm() <= f64::EPSILON {
        return None;
    }

    let mid = (a + b) / 2.0;
    let normal = Vector2::new(-chord.y, chord.x).normalize() * config.walkway_length;
    let mut start = mid + normal;
    if room.contains(&Point::new(start.x, start.y)) {
        start = mid - normal;
    }

    Some(LineString::new(vec![
        Coord { x: start.x, y: start.y },
        Coord { x: mid.x, y: mid.y },
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::point;
    use indoor_lite_geometry::rect_polygon;

    fn room() -> Vec<MultiPolygon<f64>> {
        vec![MultiPolygon::new(vec![rect_polygon(0.0, 0.0, 4.0, 4.0)])]
    }

    #[test]
    fn walkway_points_out_of_the_room() {
        let config = EngineConfig::default();
        let line = entrance_walkway(point!(x: 2.0, y: 0.0), &room(), &config).unwrap();

        let start = line.0[0];
        let end = line.0[1];
        assert_abs_diff_eq!(end.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(end.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(start.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(start.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn flips_when_normal_lands_inside() {
        let config = EngineConfig::default();
        let line = entrance_walkway(point!(x: 4.0, y: 2.0), &room(), &config).unwrap();
        assert_abs_diff_eq!(line.0[0].x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(line.0[0].y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn far_entrance_yields_nothing() {
        let config = EngineConfig::default();
        assert!(entrance_walkway(point!(x: 2.0, y: -3.0), &room(), &config).is_none());
        assert!(entrance_walkway(point!(x: 2.0, y: 2.0), &room(), &config).is_none());
    }
}
