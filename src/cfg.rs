use serde::Deserialize;
use thiserror::Error;

use crate::projection::EARTH_RADIUS_KM;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("ray length must be positive, got {0} km")]
    InvalidRayLength(f64),
    #[error("earth radius must be positive, got {0} km")]
    InvalidEarthRadius(f64),
    #[error("crossing grid must be positive, got {0} deg")]
    InvalidCrossingGrid(f64),
    #[error("ingestion queue depth must be at least 1")]
    InvalidQueueDepth,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of every bearing line [km]. System wide, identical
    /// for all stations and all queries.
    pub ray_length_km: f64,
    /// Radius of the spherical Earth model [km]
    pub earth_radius_km: f64,
    /// When set, crossing points are snapped onto a grid of this
    /// resolution [ddeg] before being grouped. None groups by exact
    /// coordinates equality.
    pub crossing_grid_deg: Option<f64>,
    /// Number of decoded records buffered between the transport reader
    /// and the storage worker.
    pub queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ray_length_km: 25.0,
            earth_radius_km: EARTH_RADIUS_KM,
            crossing_grid_deg: None,
            queue_depth: 64,
        }
    }
}

impl Config {
    /// Returns a copy of Self with given bearing line length [km]
    pub fn with_ray_length_km(&self, length_km: f64) -> Self {
        let mut s = self.clone();
        s.ray_length_km = length_km;
        s
    }
    /// Returns a copy of Self that snaps crossings onto a grid [ddeg]
    pub fn with_crossing_grid_deg(&self, grid_deg: f64) -> Self {
        let mut s = self.clone();
        s.crossing_grid_deg = Some(grid_deg);
        s
    }
    /// Returns a copy of Self with given ingestion queue depth
    pub fn with_queue_depth(&self, depth: usize) -> Self {
        let mut s = self.clone();
        s.queue_depth = depth;
        s
    }
    /// Checks this setup is usable
    pub fn validate(&self) -> Result<(), Error> {
        if self.ray_length_km.is_nan() || self.ray_length_km <= 0.0 {
            return Err(Error::InvalidRayLength(self.ray_length_km));
        }
        if self.earth_radius_km.is_nan() || self.earth_radius_km <= 0.0 {
            return Err(Error::InvalidEarthRadius(self.earth_radius_km));
        }
        if let Some(grid) = self.crossing_grid_deg {
            if grid.is_nan() || grid <= 0.0 {
                return Err(Error::InvalidCrossingGrid(grid));
            }
        }
        if self.queue_depth == 0 {
            return Err(Error::InvalidQueueDepth);
        }
        Ok(())
    }
}
