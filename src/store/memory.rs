use hifitime::Epoch;
use log::debug;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};

use super::{Store, StoreError};
use crate::measurement::Measurement;

/// In process, append only [Store]
#[derive(Debug)]
pub struct MemoryStore {
    /// Whether connection attempts may succeed
    reachable: bool,
    connected: AtomicBool,
    log: RwLock<Vec<Measurement>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            reachable: true,
            connected: AtomicBool::new(false),
            log: RwLock::new(Vec::with_capacity(1024)),
        }
    }
    /// Builds a [MemoryStore] that refuses every connection attempt
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }
    /// Number of stored measurements
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.log.read().map_err(poisoned)?.len())
    }
    /// True when nothing has been stored yet
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
    /// Copy of everything stored so far, in arrival order
    pub fn snapshot(&self) -> Result<Vec<Measurement>, StoreError> {
        Ok(self.log.read().map_err(poisoned)?.clone())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("measurement log poisoned".to_string())
}

impl Store for MemoryStore {
    fn connect(&self) -> Result<(), StoreError> {
        if !self.reachable {
            return Err(StoreError::Connection("store unreachable".to_string()));
        }
        self.connected.store(true, Ordering::Release);
        Ok(())
    }
    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
    fn insert(&self, measurement: &Measurement) -> Result<usize, StoreError> {
        if !self.connected() {
            return Err(StoreError::NotConnected);
        }
        let mut log = self.log.write().map_err(poisoned)?;
        log.push(measurement.clone());
        debug!(
            "{:?} ({}) - appended, {} measurements",
            measurement.timestamp,
            measurement.station,
            log.len()
        );
        Ok(1)
    }
    fn select_since(&self, cutoff: Epoch) -> Result<Vec<Measurement>, StoreError> {
        if !self.connected() {
            return Err(StoreError::NotConnected);
        }
        let log = self.log.read().map_err(poisoned)?;
        Ok(log
            .iter()
            .filter(|m| m.timestamp > cutoff)
            .cloned()
            .collect())
    }
}
