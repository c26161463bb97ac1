// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement properties across many candidates.

use geo::{coord, Contains, MultiPolygon, Rect};
use indoor_lite_geometry::rect_polygon;
use indoor_lite_labels::{Candidate, Frame, LabelEngine, MeasureError, Measured};
use proptest::prelude::*;

struct FixedAdvance;

impl indoor_lite_labels::TextMeasurer<u32> for FixedAdvance {
    fn measure(
        &mut self,
        candidate: &Candidate<u32>,
        _variant: &str,
        max_width: f64,
    ) -> Result<Measured, MeasureError> {
        let chars = candidate.default_variant.chars().count();
        let per_line = ((max_width / 7.0).floor() as usize).max(1);
        let lines = chars.div_ceil(per_line);
        Ok(Measured {
            rects: smallvec::smallvec![Rect::new(
                coord! { x: 0.0, y: 0.0 },
                coord! { x: chars.min(per_line) as f64 * 7.0, y: lines as f64 * 14.0 },
            )],
            content: candidate.default_variant.clone(),
            ..Measured::default()
        })
    }
}

fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x < b.max().x && b.min().x < a.max().x && a.min().y < b.max().y && b.min().y < a.max().y
}

proptest! {
    #[test]
    fn placed_labels_never_overlap(
        points in prop::collection::vec((0.0f64..40.0, 0.0f64..40.0, 1usize..12), 1..30),
    ) {
        let candidates: Vec<Candidate<u32>> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, len))| {
                Candidate::new(i as u32, geo::Point::new(x, y).into(), "x".repeat(len))
            })
            .collect();

        let mut engine = LabelEngine::default();
        let frame = Frame { zoom: 19.0, pixels_per_unit: 8.0 };
        let pass = engine
            .place_labels(candidates, Vec::<&MultiPolygon<f64>>::new(), frame, &mut FixedAdvance)
            .unwrap();

        prop_assert_eq!(pass.report.placed + pass.report.no_fit, points.len());
        for (i, a) in pass.labels.iter().enumerate() {
            for b in &pass.labels[i + 1..] {
                prop_assert!(!overlaps(&a.bounds, &b.bounds), "{:?} overlaps {:?}", a.key, b.key);
            }
        }
    }
}

fn rect_strategy() -> impl Strategy<Value = Rect<f64>> {
    (0.0f64..40.0, 0.0f64..40.0, 0.5f64..15.0, 0.5f64..15.0)
        .prop_map(|(x, y, w, h)| Rect::new(coord! { x: x, y: y }, coord! { x: x + w, y: y + h }))
}

proptest! {
    #[test]
    fn labels_avoid_walls_and_repeat_from_cache(
        rooms in prop::collection::vec(rect_strategy(), 1..12),
        points in prop::collection::vec((0.0f64..40.0, 0.0f64..40.0, 1usize..12), 0..12),
        walls in prop::collection::vec(rect_strategy(), 0..6),
    ) {
        let wall = MultiPolygon::new(walls.iter().map(|r| r.to_polygon()).collect());
        let candidates: Vec<Candidate<u32>> = rooms
            .iter()
            .enumerate()
            .map(|(i, r)| Candidate::new(i as u32, r.to_polygon().into(), format!("Room {i}")))
            .chain(points.iter().enumerate().map(|(i, &(x, y, len))| {
                Candidate::new(100 + i as u32, geo::Point::new(x, y).into(), "x".repeat(len))
            }))
            .collect();

        let mut engine = LabelEngine::default();
        let frame = Frame { zoom: 19.0, pixels_per_unit: 8.0 };
        let first = engine
            .place_labels(candidates.clone(), [&wall], frame, &mut FixedAdvance)
            .unwrap();

        prop_assert_eq!(first.report.placed + first.report.no_fit, candidates.len());
        for (i, label) in first.labels.iter().enumerate() {
            for part in &walls {
                prop_assert!(!overlaps(&label.bounds, part), "{:?} meets a wall", label.key);
            }
            for other in &first.labels[i + 1..] {
                prop_assert!(!overlaps(&label.bounds, &other.bounds));
            }
            if let Some(room) = rooms.get(label.key as usize) {
                prop_assert!(room.to_polygon().contains(&label.bounds.to_polygon()));
            }
        }

        let second = engine
            .place_labels(candidates, [&wall], frame, &mut FixedAdvance)
            .unwrap();
        prop_assert_eq!(second.labels.len(), first.labels.len());
        for (a, b) in first.labels.iter().zip(&second.labels) {
            prop_assert_eq!(a.key, b.key);
            prop_assert_eq!(a.bounds, b.bounds);
            prop_assert!(b.from_cache);
        }
    }
}

#[test]
fn room_labels_stay_inside_their_rooms_and_off_the_walls() {
    let rooms = [
        (1, rect_polygon(0.0, 0.0, 10.0, 8.0)),
        (2, rect_polygon(10.0, 0.0, 30.0, 8.0)),
        (3, rect_polygon(0.0, 8.0, 30.0, 12.0)),
    ];
    let wall = MultiPolygon::new(vec![
        rect_polygon(9.9, 0.0, 10.1, 8.0),
        rect_polygon(0.0, 7.9, 30.0, 8.1),
    ]);

    let candidates: Vec<Candidate<u32>> = rooms
        .iter()
        .map(|(key, polygon)| Candidate::new(*key, polygon.clone().into(), format!("Room {key}")))
        .collect();

    let mut engine = LabelEngine::default();
    let frame = Frame { zoom: 19.0, pixels_per_unit: 10.0 };
    let pass = engine
        .place_labels(candidates, [&wall], frame, &mut FixedAdvance)
        .unwrap();

    assert_eq!(pass.report.placed, 3);
    for label in &pass.labels {
        let (_, room) = rooms.iter().find(|(key, _)| *key == label.key).unwrap();
        assert!(room.contains(&label.bounds.to_polygon()));
        for wall_part in &wall.0 {
            let bounds = geo::BoundingRect::bounding_rect(wall_part).unwrap();
            assert!(!overlaps(&label.bounds, &bounds));
        }
    }

    // Smaller rooms were placed first
    assert_eq!(pass.labels[0].key, 1);
}
