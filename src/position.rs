//! Station positions
use hifitime::{Epoch, Unit};
use std::collections::BTreeMap;

use crate::measurement::Measurement;

/// Averaged station position over a one second bucket
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Position {
    /// Bucket start, truncated to the second
    pub timestamp: Epoch,
    /// Station name
    pub station: String,
    /// Mean longitude [ddeg]
    pub longitude: f64,
    /// Mean latitude [ddeg]
    pub latitude: f64,
    /// Number of averaged measurements
    pub samples: usize,
}

/// Start of the one second bucket `t` falls in
pub(crate) fn bucket(t: Epoch) -> Epoch {
    t.floor(1.0 * Unit::Second)
}

/// Groups measurements by (second, station) and averages each group.
/// The mean is planar, which holds for a few tens of meters of jitter
/// but not across the antimeridian or near the poles.
/// Results come sorted by (bucket, station).
pub fn aggregate(measurements: &[Measurement]) -> Vec<Position> {
    let mut buckets = BTreeMap::<(Epoch, &str), (f64, f64, usize)>::new();

    for m in measurements {
        let acc = buckets
            .entry((bucket(m.timestamp), m.station.as_str()))
            .or_insert((0.0, 0.0, 0));
        acc.0 += m.longitude;
        acc.1 += m.latitude;
        acc.2 += 1;
    }

    buckets
        .into_iter()
        .map(|((timestamp, station), (lon, lat, n))| Position {
            timestamp,
            station: station.to_string(),
            longitude: lon / n as f64,
            latitude: lat / n as f64,
            samples: n,
        })
        .collect()
}
