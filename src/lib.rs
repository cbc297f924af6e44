#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod crossing;
mod engine;
mod geojson;
mod ingest;
mod line;
mod measurement;
mod position;
mod projection;
mod store;
mod surface;
mod window;

// pub export
pub use engine::Error;


// prelude
pub mod prelude {
    pub use crate::cfg::{Config, Error as ConfigError};
    pub use crate::crossing::{correlate, Crossing};
    pub use crate::engine::Engine;
    pub use crate::ingest::{ingest, IngestReport};
    pub use crate::line::BearingLine;
    pub use crate::measurement::{DecodeError, Measurement, ValidationError};
    pub use crate::position::{aggregate, Position};
    pub use crate::projection::{distance_km, project, GeoPoint, EARTH_RADIUS_KM};
    pub use crate::store::{MemoryStore, Store, StoreError};
    pub use crate::surface::{Operation, Surface};
    pub use crate::window::Window;
    // re-export
    pub use hifitime::{Duration, Epoch, Unit};
}
