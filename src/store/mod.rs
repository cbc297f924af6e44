//! Measurements storage
use hifitime::Epoch;
use std::sync::Arc;
use thiserror::Error;

use crate::measurement::Measurement;

mod memory;
pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("failed to connect: {0}")]
    Connection(String),
    #[error("please connect to the store first")]
    NotConnected,
    #[error("{0}")]
    Backend(String),
}

/// Implement this trait to plug a persistence engine in.
/// Measurements are only ever appended: never updated nor deleted
/// (retention is the backend's business). Implementations must be
/// safe to query while another thread appends.
pub trait Store: Send + Sync {
    /// Establishes the connection (pool). Must succeed before
    /// anything else is attempted.
    fn connect(&self) -> Result<(), StoreError>;
    /// True once [Store::connect] succeeded
    fn connected(&self) -> bool;
    /// Appends one (validated) [Measurement], returns the number of affected rows.
    fn insert(&self, measurement: &Measurement) -> Result<usize, StoreError>;
    /// Returns all measurements strictly more recent than `cutoff`, in arrival order.
    fn select_since(&self, cutoff: Epoch) -> Result<Vec<Measurement>, StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn connect(&self) -> Result<(), StoreError> {
        (**self).connect()
    }
    fn connected(&self) -> bool {
        (**self).connected()
    }
    fn insert(&self, measurement: &Measurement) -> Result<usize, StoreError> {
        (**self).insert(measurement)
    }
    fn select_since(&self, cutoff: Epoch) -> Result<Vec<Measurement>, StoreError> {
        (**self).select_since(cutoff)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn connect(&self) -> Result<(), StoreError> {
        (**self).connect()
    }
    fn connected(&self) -> bool {
        (**self).connected()
    }
    fn insert(&self, measurement: &Measurement) -> Result<usize, StoreError> {
        (**self).insert(measurement)
    }
    fn select_since(&self, cutoff: Epoch) -> Result<Vec<Measurement>, StoreError> {
        (**self).select_since(cutoff)
    }
}
