use hifitime::Epoch;

use crate::{
    measurement::Measurement,
    projection::{project, GeoPoint},
};

/// Bearing line: finite geodesic ray from a station position,
/// along its reported bearing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BearingLine {
    /// Originating station
    pub station: String,
    /// Measurement instant
    pub timestamp: Epoch,
    /// Station position
    pub start: GeoPoint,
    /// Projected end point
    pub end: GeoPoint,
}

impl BearingLine {
    /// Derives the [BearingLine] of this [Measurement], projected over `length_km`
    /// on a sphere of radius `earth_radius_km`. Identical inputs always
    /// produce bit identical lines.
    pub fn from_measurement(m: &Measurement, length_km: f64, earth_radius_km: f64) -> Self {
        let start = m.position();
        Self {
            start,
            station: m.station.clone(),
            timestamp: m.timestamp,
            end: project(start, m.bearing, length_km, earth_radius_km),
        }
    }
}
