// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall synthesis.
//!
//! Derives a wall-area polygon for one level from its rooms, areas, explicit
//! walls, doors and optional floor outline:
//!
//! 1. Partition members by role.
//! 2. Collect room rings and wall lines into a centerline skeleton; it only
//!    locates door openings and is not part of the wall area.
//! 3. Buffer the room union outward by `outer - inner / 2`, so perimeter walls
//!    end up thicker than partitions.
//! 4. Union the floor outline, if any.
//! 5. Walk rooms and areas largest first: rooms not yet inside the wall area
//!    add a partition ring, then every area carves out its interior eroded by
//!    `inner / 2`, leaving only the wall band.
//! 6. Union explicit wall polygons and buffered wall lines.
//! 7. Cut door openings where door discs meet the skeleton.
//!
//! Every step works from the members' original shapes, so rebuilding an
//! unchanged level reproduces the same wall.

use geo::{Line, LineString, MultiLineString, MultiPolygon, Point};
use indoor_lite_geometry::{
    buffer_area, buffer_lines, clip_lines, contains_region, difference, disc, empty_area,
    union, union_all, BufferSpec, Shape,
};
use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::feature::{Feature, FeatureKind};
use crate::keys::FeatureKey;

/// Result of one wall synthesis
#[derive(Debug, Clone)]
pub struct WallSynthesis {
    pub wall: MultiPolygon<f64>,
    /// Polygon-ish members with the wall subtracted
    pub display: FxHashMap<FeatureKey, MultiPolygon<f64>>,
    /// Room areas, reused for entrance walkways
    pub rooms: Vec<MultiPolygon<f64>>,
}

/// An area taking part in the largest-first carving pass
struct CarveArea {
    area: MultiPolygon<f64>,
    size: f64,
    walled: bool,
}

/// Members sorted by the role they play in synthesis
#[derive(Default)]
struct Partition {
    walled_rooms: Vec<MultiPolygon<f64>>,
    unwalled_areas: Vec<MultiPolygon<f64>>,
    wall_lines: Vec<LineString<f64>>,
    wall_polygons: Vec<MultiPolygon<f64>>,
    doors: Vec<(Point<f64>, f64)>,
    floors: Vec<MultiPolygon<f64>>,
    /// Every polygon-ish member, clipped after synthesis
    displayed: Vec<(FeatureKey, MultiPolygon<f64>)>,
}

impl Partition {
    fn build<'a, I>(members: I, config: &EngineConfig) -> Self
    where
        I: IntoIterator<Item = (FeatureKey, &'a Feature)>,
    {
        let mut partition = Partition::default();

        for (key, feature) in members {
            let kind = feature.kind();
            let area = feature.shape.to_multi_polygon();
            if let Some(area) = &area {
                partition.displayed.push((key, area.clone()));
            }

            match (kind, area) {
                (FeatureKind::Room, Some(area)) => partition.walled_rooms.push(area),
                (FeatureKind::Area, Some(area)) => partition.unwalled_areas.push(area),
                (FeatureKind::FloorOutline, Some(area)) => partition.floors.push(area),
                (FeatureKind::Wall, Some(area)) => partition.wall_polygons.push(area),
                (FeatureKind::Wall, None) => {
                    let lines = feature.shape.line_strings();
                    if lines.is_empty() {
                        skip(key, kind, &feature.shape);
                    }
                    partition.wall_lines.extend(lines);
                }
                (FeatureKind::Door, _) => match feature.shape.centroid() {
                    Some(center) => partition
                        .doors
                        .push((center, feature.door_width(config.default_door_width))),
                    None => skip(key, kind, &feature.shape),
                },
                (FeatureKind::Room | FeatureKind::Area | FeatureKind::FloorOutline, None) => {
                    skip(key, kind, &feature.shape)
                }
                (FeatureKind::Building | FeatureKind::Other, _) => {}
            }
        }

        partition
    }

    /// Rings of walled rooms plus explicit wall lines.
    fn skeleton(&self) -> MultiLineString<f64> {
        let rings = self.walled_rooms.iter().flat_map(|area| {
            area.0.iter().flat_map(|p| {
                std::iter::once(p.exterior().clone()).chain(p.interiors().iter().cloned())
            })
        });
        MultiLineString::new(rings.chain(self.wall_lines.iter().cloned()).collect())
    }
}

fn skip(key: FeatureKey, kind: FeatureKind, shape: &Shape) {
    let error = Error::GeometryMismatch {
        key,
        role: kind.as_str(),
        geometry: shape_name(shape),
    };
    tracing::debug!(%error, "Ignoring feature for wall synthesis");
}

fn shape_name(shape: &Shape) -> &'static str {
    match shape {
        Shape::Point(_) => "point",
        Shape::Line(_) => "line",
        Shape::Polygon(_) => "polygon",
        Shape::MultiPoint(_) => "multipoint",
        Shape::MultiLine(_) => "multiline",
        Shape::MultiPolygon(_) => "multipolygon",
    }
}

/// Synthesize the wall area for a set of level members.
pub fn synthesize_walls<'a, I>(members: I, config: &EngineConfig) -> WallSynthesis
where
    I: IntoIterator<Item = (FeatureKey, &'a Feature)>,
{
    use geo::Area;

    let partition = Partition::build(members, config);
    let skeleton = partition.skeleton();
    let half_inner = config.half_inner();

    let rooms = union_all(partition.walled_rooms.iter());
    let mut wall = buffer_area(&rooms, BufferSpec::flat(config.perimeter_offset()));

    if !partition.floors.is_empty() {
        let floor = union_all(partition.floors.iter());
        wall = union(&wall, &floor);
    }

    let mut carve: Vec<CarveArea> = partition
        .walled_rooms
        .iter()
        .map(|a| (a, true))
        .chain(partition.unwalled_areas.iter().map(|a| (a, false)))
        .map(|(area, walled)| CarveArea {
            size: area.unsigned_area(),
            area: area.clone(),
            walled,
        })
        .collect();
    // Stable: equal sizes keep member order
    carve.sort_by(|a, b| b.size.total_cmp(&a.size));

    for item in &carve {
        if item.walled && !contains_region(&wall, &item.area) {
            let ring = buffer_area(&item.area, BufferSpec::flat(half_inner));
            wall = union(&wall, &ring);
        }
        let interior = buffer_area(&item.area, BufferSpec::flat(-half_inner));
        wall = difference(&wall, &interior);
    }

    let drawn_lines = buffer_lines(
        &MultiLineString::new(partition.wall_lines.clone()),
        BufferSpec::square(half_inner),
    );
    wall = union_all(
        std::iter::once(&wall)
            .chain(partition.wall_polygons.iter())
            .chain(std::iter::once(&drawn_lines)),
    );

    let openings = door_openings(&partition.doors, &skeleton, config);
    wall = difference(&wall, &openings);

    let display = partition
        .displayed
        .into_iter()
        .map(|(key, area)| (key, difference(&area, &wall)))
        .collect();

    WallSynthesis {
        wall,
        display,
        rooms: partition.walled_rooms,
    }
}

/// Area to remove from the wall for door openings.
///
/// Only the skeleton pieces inside a door disc are cut, so a door far from
/// any wall line leaves the wall untouched.
fn door_openings(
    doors: &[(Point<f64>, f64)],
    skeleton: &MultiLineString<f64>,
    config: &EngineConfig,
) -> MultiPolygon<f64> {
    let discs: Vec<MultiPolygon<f64>> = doors
        .iter()
        .filter_map(|&(center, width)| {
            let radius = width / 2.0 - config.door_cut_margin;
            if radius <= 0.0 {
                tracing::debug!(width, "Door too narrow to cut an opening");
                return None;
            }
            Some(MultiPolygon::new(vec![disc(
                center,
                radius,
                config.quadrant_segments,
            )]))
        })
        .collect();

    if discs.is_empty() || skeleton.0.is_empty() {
        return empty_area();
    }

    let discs = union_all(discs.iter());
    let interrupted = segments(&clip_lines(&discs, skeleton));
    buffer_lines(&interrupted, BufferSpec::square(config.door_cut_margin))
}

/// Split line work into distinct two-point segments.
///
/// Adjacent rooms share edges running in opposite directions, which clip
/// into lines that fold back on themselves; square caps on a fold lose one
/// end, so each segment is buffered on its own.
fn segments(lines: &MultiLineString<f64>) -> MultiLineString<f64> {
    let mut pieces: Vec<Line<f64>> = lines
        .0
        .iter()
        .flat_map(|line| line.lines())
        .filter(|l| l.start != l.end)
        .map(|l| {
            let ordered = (l.start.x, l.start.y) <= (l.end.x, l.end.y);
            if ordered {
                l
            } else {
                Line::new(l.end, l.start)
            }
        })
        .collect();
    pieces.sort_by(|a, b| {
        (a.start.x, a.start.y, a.end.x, a.end.y)
            .partial_cmp(&(b.start.x, b.start.y, b.end.x, b.end.y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pieces.dedup();

    MultiLineString::new(
        pieces
            .into_iter()
            .map(|l| LineString::new(vec![l.start, l.end]))
            .collect(),
    )
}
