// linetrack-api: Async Rust client for the line-tracking REST API

pub mod business;
pub mod client;
pub mod counters;
pub mod error;
pub mod models;
pub mod station;
pub mod transport;

pub use client::LineClient;
pub use error::Error;
pub use models::{Business, CounterRecord, CreatedStation, Direction, FieldValue, RecordId, Station};
pub use transport::{TlsMode, TransportConfig};
