//! Bearing line crossings
use itertools::Itertools;
use log::debug;
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::{line::BearingLine, projection::GeoPoint};

/// Candidate transmitter location: intersection of
/// bearing lines reported by distinct stations.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Crossing {
    /// Longitude [ddeg]
    pub longitude: f64,
    /// Latitude [ddeg]
    pub latitude: f64,
    /// Number of station pairs crossing right here
    pub weight: usize,
}

impl Crossing {
    /// Crossing location as a [GeoPoint]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Slack on the segment parameters, so touching end points still count
const SEGMENT_TOLERANCE: f64 = 1.0E-9;

/// Segment/segment intersection in the (longitude, latitude) plane.
/// Parallel and colinear segments never intersect.
pub(crate) fn intersection(a: &BearingLine, b: &BearingLine) -> Option<GeoPoint> {
    let p = a.start.to_vector();
    let r = a.end.to_vector() - p;
    let q = b.start.to_vector();
    let s = b.end.to_vector() - q;

    let denom = r.perp(&s);
    if denom.abs() <= f64::EPSILON * r.norm() * s.norm() {
        return None;
    }

    let qp = q - p;
    let t = qp.perp(&s) / denom;
    let u = qp.perp(&r) / denom;

    let range = -SEGMENT_TOLERANCE..=1.0 + SEGMENT_TOLERANCE;
    if range.contains(&t) && range.contains(&u) {
        Some(GeoPoint::from_vector(p + r * t))
    } else {
        None
    }
}

/// Grouping key. Exact match on the bit pattern, with -0.0 folded onto 0.0.
fn key(point: GeoPoint) -> (u64, u64) {
    (
        (point.longitude + 0.0).to_bits(),
        (point.latitude + 0.0).to_bits(),
    )
}

fn snap(point: GeoPoint, grid_deg: f64) -> GeoPoint {
    GeoPoint::new(
        (point.longitude / grid_deg).round() * grid_deg,
        (point.latitude / grid_deg).round() * grid_deg,
    )
}

/// Intersects every pair of lines from different stations and aggregates
/// identical intersection points into weighted [Crossing]s.
/// Pairs are oriented so the lexicographically lower station comes first:
/// each unordered station pair counts once per point and a station
/// never crosses itself.
/// `grid_deg` snaps points onto a regular grid before grouping;
/// None preserves exact matching.
/// Crossings come out in discovery order.
pub fn correlate(lines: &[BearingLine], grid_deg: Option<f64>) -> Vec<Crossing> {
    let mut crossings = Vec::<Crossing>::new();
    let mut index = HashMap::<(u64, u64), usize>::new();
    let mut contributors = HashSet::<((u64, u64), &str, &str)>::new();

    // O(n²) over the window. Fine for tens of stations,
    // larger fleets will need a spatial index here.
    for (a, b) in lines.iter().tuple_combinations() {
        let (a, b) = match a.station.cmp(&b.station) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => continue,
        };

        let Some(mut point) = intersection(a, b) else {
            continue;
        };
        if let Some(grid) = grid_deg {
            point = snap(point, grid);
        }

        let k = key(point);
        if !contributors.insert((k, a.station.as_str(), b.station.as_str())) {
            continue;
        }

        debug!(
            "{:?} ({} x {}) - crossing at {:?}",
            a.timestamp.max(b.timestamp),
            a.station,
            b.station,
            point
        );

        if let Some(&idx) = index.get(&k) {
            crossings[idx].weight += 1;
        } else {
            index.insert(k, crossings.len());
            crossings.push(Crossing {
                longitude: point.longitude,
                latitude: point.latitude,
                weight: 1,
            });
        }
    }
    crossings
}
