//! Query surface
use hifitime::Epoch;
use log::info;
use std::str::FromStr;

use crate::{engine::Engine, geojson, store::Store, window::Window, Error};

/// Read operations exposed to clients
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Averaged station positions
    Positions,
    /// Bearing lines
    Headings,
    /// Weighted bearing line crossings
    Crossings,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Positions => write!(f, "positions"),
            Self::Headings => write!(f, "headings"),
            Self::Crossings => write!(f, "crossings"),
        }
    }
}

impl FromStr for Operation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().trim_matches('/').to_lowercase();
        match c.as_str() {
            "positions" => Ok(Self::Positions),
            "headings" | "lines" => Ok(Self::Headings),
            "crossings" => Ok(Self::Crossings),
            _ => Err(Error::InvalidArgument(format!("unknown operation \"{}\"", c))),
        }
    }
}

/// Transport agnostic query surface: turns one request, an [Operation]
/// and its "seconds" parameter, into a GeoJSON FeatureCollection document.
/// Requests either fully succeed or fail, there is no partial output.
pub struct Surface<'a, S: Store> {
    engine: &'a Engine<S>,
}

impl<'a, S: Store> Surface<'a, S> {
    pub fn new(engine: &'a Engine<S>) -> Self {
        Self { engine }
    }
    /// Serves one request, looking back from the current instant
    pub fn respond(&self, operation: Operation, seconds: &str) -> Result<String, Error> {
        let window = seconds.parse::<Window>()?;
        let now = Epoch::now().map_err(|e| Error::Clock(e.to_string()))?;
        self.serve(now, operation, window)
    }
    /// Serves one request, looking back from `now`
    pub fn respond_at(
        &self,
        now: Epoch,
        operation: Operation,
        seconds: &str,
    ) -> Result<String, Error> {
        let window = seconds.parse::<Window>()?;
        self.serve(now, operation, window)
    }
    fn serve(&self, now: Epoch, operation: Operation, window: Window) -> Result<String, Error> {
        let since = window.duration();
        let (count, doc) = match operation {
            Operation::Positions => {
                let positions = self.engine.positions_at(now, since)?;
                (positions.len(), geojson::positions(&positions))
            },
            Operation::Headings => {
                let lines = self.engine.lines_at(now, since)?;
                (lines.len(), geojson::lines(&lines))
            },
            Operation::Crossings => {
                let crossings = self.engine.crossings_at(now, since)?;
                (crossings.len(), geojson::crossings(&crossings))
            },
        };
        info!("{:?} - {}: {} features over the last {}", now, operation, count, since);
        Ok(doc.to_string())
    }
}
