use hifitime::Epoch;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

use crate::projection::GeoPoint;

/// Reasons a [Measurement] is refused at the write boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("bearing out of range: {0}")]
    BearingOutOfRange(f64),
    #[error("missing station")]
    MissingStation,
    #[error("storage unavailable")]
    StorageUnavailable,
}

/// Failures to turn one transport record into a [Measurement]
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timestamp \"{0}\": {1}")]
    Timestamp(String, String),
    #[error("not utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Bearing observation reported by one station
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Measurement {
    /// Sampling instant, as reported by the station
    pub timestamp: Epoch,
    /// Station name
    pub station: String,
    /// Station longitude [ddeg]
    pub longitude: f64,
    /// Station latitude [ddeg]
    pub latitude: f64,
    /// Bearing to target [deg], clockwise from north
    pub bearing: f64,
}

impl Measurement {
    /// Lowest accepted bearing [deg]
    pub const MIN_BEARING: f64 = 0.0;
    /// Highest accepted bearing [deg], inclusive
    pub const MAX_BEARING: f64 = 360.0;

    /// Builds new [Measurement] observed by `station` at `timestamp`
    /// from position (longitude, latitude) [ddeg].
    pub fn new(
        timestamp: Epoch,
        station: &str,
        longitude: f64,
        latitude: f64,
        bearing: f64,
    ) -> Self {
        Self {
            timestamp,
            station: station.to_string(),
            longitude,
            latitude,
            bearing,
        }
    }
    /// Station position at observation time
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
    /// Checks the record invariants. Storage readiness is checked
    /// by the engine, right before insertion.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(Self::MIN_BEARING..=Self::MAX_BEARING).contains(&self.bearing) {
            return Err(ValidationError::BearingOutOfRange(self.bearing));
        }
        if self.station.is_empty() {
            return Err(ValidationError::MissingStation);
        }
        Ok(())
    }
}

/// Wire record, one JSON object per line
#[derive(Debug, Deserialize)]
struct Record {
    timestamp: String,
    #[serde(default)]
    station: String,
    longitude: f64,
    latitude: f64,
    bearing: f64,
}

/*
 * Station software emits ISO-8601 "Z" timestamps,
 * hifitime wants an explicit timescale.
 */
fn parse_timestamp(content: &str) -> Result<Epoch, DecodeError> {
    let content = content.trim();
    let parsed = match content.strip_suffix('Z') {
        Some(utc) => Epoch::from_str(&format!("{} UTC", utc)),
        None => Epoch::from_str(content),
    };
    parsed.map_err(|e| DecodeError::Timestamp(content.to_string(), e.to_string()))
}

impl FromStr for Measurement {
    type Err = DecodeError;
    /// Decodes one transport record. Semantic checks are left to [Measurement::validate].
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let record: Record = serde_json::from_str(line)?;
        Ok(Self {
            timestamp: parse_timestamp(&record.timestamp)?,
            station: record.station,
            longitude: record.longitude,
            latitude: record.latitude,
            bearing: record.bearing,
        })
    }
}
