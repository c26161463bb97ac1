// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full pipeline from GeoJSON to a rendered frame.

use std::cell::Cell;
use std::time::{Duration, Instant};

use geo::{coord, Rect};
use indoor_lite_processing::{Config, FixedAdvance, IndoorMap, View, WallsDocument};
use indoor_lite_topology::{Clock, MapItem, PassOutcome};

const FLOOR: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature",
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,8],[0,8],[0,0]]]},
         "properties": {"indoor": "room", "level": "0", "name": "Lobby"}},
        {"type": "Feature",
         "geometry": {"type": "Polygon", "coordinates": [[[10,0],[30,0],[30,8],[10,8],[10,0]]]},
         "properties": {"indoor": "room", "level": "0;1", "name": "Hall"}},
        {"type": "Feature",
         "geometry": {"type": "Point", "coordinates": [10, 4]},
         "properties": {"door": "yes", "level": "0"}},
        {"type": "Feature",
         "geometry": {"type": "Point", "coordinates": [5, 0]},
         "properties": {"entrance": "main", "level": "0"}},
        {"type": "Feature",
         "geometry": {"type": "Polygon", "coordinates": [[[-1,-1],[31,-1],[31,9],[-1,9],[-1,-1]]]},
         "properties": {"building": "yes", "name": "Annex"}}
    ]
}"#;

fn view(level: i32) -> View {
    View {
        level,
        extent: Rect::new(coord! { x: -5.0, y: -5.0 }, coord! { x: 35.0, y: 15.0 }),
        zoom: 21.0,
    }
}

#[test]
fn frame_contains_walls_walkways_and_labels() {
    let mut map = IndoorMap::new(Config::default());
    assert_eq!(map.load_geojson(FLOOR).unwrap(), 5);

    // First frame before any rebuild: walls are still empty
    let frame = map.frame(&view(0), &mut FixedAdvance::default()).unwrap();
    assert!(!frame.items.iter().any(|i| matches!(i, MapItem::Wall { .. })));
    drop(frame);

    let outcome = map.tick(&view(0)).unwrap();
    assert!(matches!(outcome, Some(PassOutcome::Complete { rebuilt: 1 })));
    assert_eq!(map.tick(&view(0)).unwrap(), None);

    let frame = map.frame(&view(0), &mut FixedAdvance::default()).unwrap();
    assert_eq!(frame.levels, vec![0, 1]);
    assert!(frame.items.iter().any(|i| matches!(i, MapItem::Wall { .. })));
    assert!(frame.items.iter().any(|i| matches!(i, MapItem::Walkway { .. })));
    assert!(frame.items.iter().any(|i| matches!(i, MapItem::Feature { level: None, .. })));

    let contents: Vec<&str> = frame.labels.iter().map(|l| l.content.as_str()).collect();
    assert!(contents.contains(&"Lobby"));
    assert!(contents.contains(&"Hall"));
    // The building outline is drawn but never labelled
    assert!(!contents.contains(&"Annex"));

    let document = WallsDocument::from_frame(0, &frame);
    let json: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    assert!(json["features"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["properties"]["footway"] == "entrance_walkway"));
}

#[test]
fn second_frame_reuses_cached_labels() {
    let mut map = IndoorMap::new(Config::default());
    map.load_geojson(FLOOR).unwrap();
    map.rebuild_all().unwrap();

    let first = map.frame(&view(0), &mut FixedAdvance::default()).unwrap();
    assert!(first.labels.iter().all(|l| !l.from_cache));
    let placed = first.report.placed;
    drop(first);

    let second = map.frame(&view(0), &mut FixedAdvance::default()).unwrap();
    assert_eq!(second.report.placed, placed);
    assert!(second.labels.iter().all(|l| l.from_cache));
}

struct SlowClock {
    now: Cell<Instant>,
}

impl Clock for SlowClock {
    fn now(&self) -> Instant {
        let now = self.now.get();
        self.now.set(now + Duration::from_millis(120));
        now
    }
}

#[test]
fn tick_spreads_rebuilds_over_frames() {
    let mut map = IndoorMap::with_clock(
        Config::default(),
        SlowClock {
            now: Cell::new(Instant::now()),
        },
    );
    for i in 0..3 {
        let x = f64::from(i) * 100.0;
        map.load_geojson(&format!(
            r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature",
                "geometry": {{"type": "Polygon", "coordinates": [[[{x},0],[{x2},0],[{x2},5],[{x},5],[{x},0]]]}},
                "properties": {{"indoor": "room", "level": "0"}}}}]}}"#,
            x = x,
            x2 = x + 5.0
        ))
        .unwrap();
    }
    let wide = View {
        level: 0,
        extent: Rect::new(coord! { x: -10.0, y: -10.0 }, coord! { x: 400.0, y: 10.0 }),
        zoom: 19.0,
    };

    let first = map.tick(&wide).unwrap();
    assert!(matches!(first, Some(PassOutcome::Deferred { rebuilt: 1, .. })));

    let mut ticks = 0;
    while !map.engine().dirty_levels(0, &wide.extent).is_empty() {
        map.tick(&wide).unwrap();
        ticks += 1;
        assert!(ticks < 100);
    }
    assert!(map.engine().dirty_levels(0, &wide.extent).is_empty());
}
