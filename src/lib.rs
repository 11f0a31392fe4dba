//! Smart Traffic Library
//!
//! Congestion-aware city routing for Bengkulu:
//! - Static congestion rules keyed by weekday and hour
//! - Routes from the public OSRM service, rescaled per transport mode
//! - Detour through a synthetic via-point when an endpoint is heavy
//! - Leaflet map and HTML page rendering

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod render;
pub mod utils;

pub use crate::core::{Navigator, RouteRequester};
pub use models::{
    AppError, AppResult, Clock, CongestionEstimate, CongestionLevel, ErrorCode, LatLng, Location,
    LocationId, LocationRegistry, Route, RoutePlan, RouteStep, TrafficConfig, TransportKind,
};
pub use utils::telemetry::RouteStats;
