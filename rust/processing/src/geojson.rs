// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal GeoJSON model for feature input and map output.

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use indoor_lite_geometry::Shape;
use indoor_lite_topology::{Feature, Tags};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// `[x, y]`, optionally followed by an altitude which is ignored
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPoint { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoFeature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into engine features. Features without usable geometry are
    /// skipped with a warning.
    pub fn into_features(self) -> Vec<Feature> {
        self.features
            .into_iter()
            .enumerate()
            .filter_map(|(index, feature)| match feature.into_feature() {
                Ok(feature) => Some(feature),
                Err(error) => {
                    tracing::warn!(index, %error, "Skipping GeoJSON feature");
                    None
                }
            })
            .collect()
    }
}

impl GeoFeature {
    pub fn new(geometry: Geometry, tags: &Tags) -> Self {
        let mut properties = Map::new();
        let mut sorted: Vec<_> = tags.iter().collect();
        sorted.sort();
        for (key, value) in sorted {
            properties.insert(key.clone(), Value::String(value.clone()));
        }
        Self {
            geometry: Some(geometry),
            properties,
        }
    }

    pub fn into_feature(self) -> Result<Feature> {
        let geometry = self
            .geometry
            .ok_or_else(|| Error::InvalidGeometry("missing geometry".to_string()))?;
        let shape = Shape::try_from(&geometry)?;
        Ok(Feature::new(shape, properties_to_tags(self.properties)))
    }
}

/// String properties become tags as is, numbers and booleans are
/// stringified, everything else is dropped.
fn properties_to_tags(properties: Map<String, Value>) -> Tags {
    properties
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, value))
        })
        .collect()
}

fn coord(position: &Position) -> Result<Coord<f64>> {
    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        _ => Err(Error::InvalidGeometry(format!(
            "bad position {position:?}"
        ))),
    }
}

fn line(positions: &[Position]) -> Result<LineString<f64>> {
    positions.iter().map(coord).collect::<Result<Vec<_>>>().map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| Error::InvalidGeometry("polygon without rings".to_string()))?;
    let interiors = interiors.iter().map(|r| line(r)).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(line(exterior)?, interiors))
}

impl TryFrom<&Geometry> for Shape {
    type Error = Error;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        let geometry: geo::Geometry<f64> = match geometry {
            Geometry::Point { coordinates } => Point::from(coord(coordinates)?).into(),
            Geometry::LineString { coordinates } => line(coordinates)?.into(),
            Geometry::Polygon { coordinates } => polygon(coordinates)?.into(),
            Geometry::MultiPoint { coordinates } => MultiPoint::new(
                coordinates
                    .iter()
                    .map(|p| coord(p).map(Point::from))
                    .collect::<Result<Vec<_>>>()?,
            )
            .into(),
            Geometry::MultiLineString { coordinates } => MultiLineString::new(
                coordinates.iter().map(|l| line(l)).collect::<Result<Vec<_>>>()?,
            )
            .into(),
            Geometry::MultiPolygon { coordinates } => MultiPolygon::new(
                coordinates.iter().map(|p| polygon(p)).collect::<Result<Vec<_>>>()?,
            )
            .into(),
        };
        Shape::try_from(geometry).map_err(|e| Error::InvalidGeometry(e.to_string()))
    }
}

fn positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(|c| vec![c.x, c.y]).collect()
}

fn rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(positions)
        .collect()
}

impl From<&MultiPolygon<f64>> for Geometry {
    fn from(area: &MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon {
            coordinates: area.0.iter().map(rings).collect(),
        }
    }
}

impl From<&LineString<f64>> for Geometry {
    fn from(line: &LineString<f64>) -> Self {
        Geometry::LineString {
            coordinates: positions(line),
        }
    }
}

impl From<&Shape> for Geometry {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Point(p) => Geometry::Point {
                coordinates: vec![p.x(), p.y()],
            },
            Shape::Line(l) => l.into(),
            Shape::Polygon(p) => Geometry::Polygon {
                coordinates: rings(p),
            },
            Shape::MultiPoint(mp) => Geometry::MultiPoint {
                coordinates: mp.0.iter().map(|p| vec![p.x(), p.y()]).collect(),
            },
            Shape::MultiLine(ml) => Geometry::MultiLineString {
                coordinates: ml.0.iter().map(positions).collect(),
            },
            Shape::MultiPolygon(mp) => mp.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoor_lite_topology::FeatureKind;

    const ROOM: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [5, 0], [5, 5], [0, 5], [0, 0]]]
                },
                "properties": {"indoor": "room", "level": 0, "name": "Lobby", "ref": null}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [5, 2.5, 12.0]},
                "properties": {"door": "yes", "level": "0"}
            },
            {"type": "Feature", "geometry": null, "properties": {}},
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [1]},
                "properties": {}
            }
        ]
    }"#;

    #[test]
    fn parses_features_and_skips_broken_ones() {
        let features = FeatureCollection::from_json(ROOM).unwrap().into_features();
        assert_eq!(features.len(), 2);

        let room = &features[0];
        assert_eq!(room.kind(), FeatureKind::Room);
        assert_eq!(room.tag("level"), Some("0"));
        assert_eq!(room.tag("name"), Some("Lobby"));
        assert_eq!(room.tag("ref"), None);

        assert_eq!(features[1].kind(), FeatureKind::Door);
        assert!(matches!(features[1].shape, Shape::Point(p) if p.x() == 5.0 && p.y() == 2.5));
    }

    #[test]
    fn rejects_unknown_documents() {
        assert!(FeatureCollection::from_json(r#"{"type": "Feature"}"#).is_err());
        assert!(FeatureCollection::from_json("not json").is_err());
    }

    #[test]
    fn writes_shapes_back() {
        let shape: Shape = indoor_lite_geometry::rect_polygon(0.0, 0.0, 1.0, 1.0).into();
        let value = serde_json::to_value(Geometry::from(&shape)).unwrap();
        assert_eq!(value["type"], "Polygon");
        assert_eq!(value["coordinates"][0].as_array().unwrap().len(), 5);
    }
}
