//! Bearing line correlation engine
use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;

use crate::{
    cfg::{Config, Error as ConfigError},
    crossing::{correlate, Crossing},
    line::BearingLine,
    measurement::{DecodeError, Measurement, ValidationError},
    position::{aggregate, Position},
    store::{Store, StoreError},
    window::Window,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid measurement: {0}")]
    Validation(#[from] ValidationError),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("system time unavailable: {0}")]
    Clock(String),
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection(_) | StoreError::NotConnected => Self::Connection(e.to_string()),
            StoreError::Backend(e) => Self::Storage(e),
        }
    }
}

/// Correlation engine: validates measurements on their way to the [Store],
/// and derives station [Position]s, [BearingLine]s and [Crossing]s
/// from the store content, on demand.
/// The engine holds no state besides its setup: every call issues one
/// store request and can run concurrently with any other.
#[derive(Debug)]
pub struct Engine<S: Store> {
    /// Engine configuration
    cfg: Config,
    /// Measurements storage
    store: S,
}

impl<S: Store> Engine<S> {
    /// Builds new [Engine] on top of given [Store], using given [Config] preset.
    pub fn new(cfg: Config, store: S) -> Result<Self, Error> {
        cfg.validate()?;
        if let Some(grid) = cfg.crossing_grid_deg {
            info!("crossings snapped onto a {} deg grid", grid);
        }
        Ok(Self { cfg, store })
    }
    /// Active [Config]
    pub fn config(&self) -> &Config {
        &self.cfg
    }
    /// Underlying [Store]
    pub fn store(&self) -> &S {
        &self.store
    }
    /// Connects the underlying [Store]
    pub fn connect(&self) -> Result<(), Error> {
        self.store.connect()?;
        info!("connected to store");
        Ok(())
    }
    /// Validates and appends one [Measurement]
    pub fn add(&self, m: &Measurement) -> Result<(), Error> {
        m.validate()?;
        if !self.store.connected() {
            return Err(ValidationError::StorageUnavailable.into());
        }
        let rows = self.store.insert(m)?;
        if rows != 1 {
            return Err(Error::Storage(format!(
                "insert resulted in {} rows, instead of 1",
                rows
            )));
        }
        debug!("{:?} ({}) - stored, bearing {}", m.timestamp, m.station, m.bearing);
        Ok(())
    }
    fn now() -> Result<Epoch, Error> {
        Epoch::now().map_err(|e| Error::Clock(e.to_string()))
    }
    /// Measurements within `since` of `now`, in arrival order
    fn select(&self, now: Epoch, since: Duration) -> Result<Vec<Measurement>, Error> {
        let window = Window::new(since)?;
        let selected = self.store.select_since(window.cutoff(now))?;
        debug!("{:?} - {} measurements over the last {}", now, selected.len(), since);
        Ok(selected)
    }
    /// Station [Position]s over the last `since`, sorted by (second, station).
    pub fn positions(&self, since: Duration) -> Result<Vec<Position>, Error> {
        self.positions_at(Self::now()?, since)
    }
    /// [Engine::positions] observed from `now`
    pub fn positions_at(&self, now: Epoch, since: Duration) -> Result<Vec<Position>, Error> {
        let positions = aggregate(&self.select(now, since)?);
        debug!("{:?} - {} positions", now, positions.len());
        Ok(positions)
    }
    /// [BearingLine]s over the last `since`, sorted by (timestamp, station).
    pub fn lines(&self, since: Duration) -> Result<Vec<BearingLine>, Error> {
        self.lines_at(Self::now()?, since)
    }
    /// [Engine::lines] observed from `now`
    pub fn lines_at(&self, now: Epoch, since: Duration) -> Result<Vec<BearingLine>, Error> {
        let (length_km, radius_km) = (self.cfg.ray_length_km, self.cfg.earth_radius_km);
        let lines = self
            .select(now, since)?
            .iter()
            .sorted_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.station.cmp(&b.station))
            })
            .map(|m| BearingLine::from_measurement(m, length_km, radius_km))
            .collect::<Vec<_>>();
        debug!("{:?} - {} lines", now, lines.len());
        Ok(lines)
    }
    /// Weighted [Crossing]s of the bearing lines over the last `since`.
    pub fn crossings(&self, since: Duration) -> Result<Vec<Crossing>, Error> {
        self.crossings_at(Self::now()?, since)
    }
    /// [Engine::crossings] observed from `now`
    pub fn crossings_at(&self, now: Epoch, since: Duration) -> Result<Vec<Crossing>, Error> {
        let lines = self.lines_at(now, since)?;
        let crossings = correlate(&lines, self.cfg.crossing_grid_deg);
        debug!("{:?} - {} crossings from {} lines", now, crossings.len(), lines.len());
        Ok(crossings)
    }
}
