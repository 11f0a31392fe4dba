//! Utils Module - Helper Functions & Shared Utilities
//!
//! Berisi fungsi-fungsi pembantu yang digunakan di seluruh aplikasi.

pub mod constants;
pub mod geo;
pub mod telemetry;

pub use constants::*;
pub use telemetry::{RouteStats, RouteStatsSnapshot};
