use hifitime::{Duration, Epoch, Unit};
use std::str::FromStr;

use crate::Error;

/// Look back period of every read query. At least one second.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Window(Duration);

impl Window {
    /// Builds new [Window] spanning `duration`,
    /// which must not be shorter than one second.
    pub fn new(duration: Duration) -> Result<Self, Error> {
        if duration < 1.0 * Unit::Second {
            return Err(Error::InvalidArgument(format!(
                "since should be >= 1s, got {}",
                duration
            )));
        }
        Ok(Self(duration))
    }
    /// Builds new [Window] looking `seconds` back
    pub fn from_seconds(seconds: u64) -> Result<Self, Error> {
        Self::new(seconds as f64 * Unit::Second)
    }
    pub fn duration(&self) -> Duration {
        self.0
    }
    /// Oldest instant this window excludes, when observed at `now`
    pub fn cutoff(&self, now: Epoch) -> Epoch {
        now - self.0
    }
}

impl FromStr for Window {
    type Err = Error;
    /// Parses the "seconds" query parameter
    fn from_str(seconds: &str) -> Result<Self, Self::Err> {
        let seconds = seconds
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidArgument("seconds must be a number".to_string()))?;
        Self::from_seconds(seconds)
    }
}
