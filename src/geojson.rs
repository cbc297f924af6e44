//! GeoJSON encoding of query results
use serde_json::{json, Value};

use crate::{crossing::Crossing, line::BearingLine, position::Position, projection::GeoPoint};

fn coordinates(point: GeoPoint) -> Value {
    json!([point.longitude, point.latitude])
}

fn feature(geometry: Value, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    })
}

fn collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// One Point feature per station [Position]
pub fn positions(positions: &[Position]) -> Value {
    collection(
        positions
            .iter()
            .map(|p| {
                feature(
                    json!({
                        "type": "Point",
                        "coordinates": coordinates(GeoPoint::new(p.longitude, p.latitude)),
                    }),
                    json!({ "id": format!("{}{}", p.station, p.timestamp) }),
                )
            })
            .collect(),
    )
}

/// One LineString feature per [BearingLine], from the station to the projected end
pub fn lines(lines: &[BearingLine]) -> Value {
    collection(
        lines
            .iter()
            .map(|line| {
                feature(
                    json!({
                        "type": "LineString",
                        "coordinates": [coordinates(line.start), coordinates(line.end)],
                    }),
                    json!({ "id": format!("{}{}", line.station, line.timestamp) }),
                )
            })
            .collect(),
    )
}

/// One Point feature per [Crossing], carrying its weight
pub fn crossings(crossings: &[Crossing]) -> Value {
    collection(
        crossings
            .iter()
            .map(|c| {
                feature(
                    json!({
                        "type": "Point",
                        "coordinates": coordinates(c.point()),
                    }),
                    json!({
                        "id": format!("{:.6} {:.6} {}", c.longitude, c.latitude, c.weight),
                        "weight": c.weight,
                    }),
                )
            })
            .collect(),
    )
}
