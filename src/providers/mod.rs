//! Providers Module - External Data Sources
//!
//! Jalur data: OSRM directions service.

pub mod osrm;

pub use osrm::{DirectionsQuery, FetchOutcome, OsrmClient};
