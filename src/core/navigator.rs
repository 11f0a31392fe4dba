//! Route Orchestrator
//!
//! Validates a request, fetches the primary route, scales its duration by the
//! worse of the two endpoint congestion factors and, when either endpoint is
//! heavy, asks for a detour through a synthetic via-point.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::congestion;
use crate::core::requester::RouteRequester;
use crate::models::config::TrafficConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    CongestionEstimate, LatLng, Location, LocationId, Route, RoutePlan, TransportKind,
};
use crate::utils::constants::DETOUR_OFFSET_DEG;
use crate::utils::geo::midpoint;

/// Parse a location id supplied as text
pub fn parse_location_id(raw: &str) -> AppResult<LocationId> {
    let trimmed = raw.trim();
    match trimmed.parse::<LocationId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::invalid_location_id(trimmed)),
    }
}

/// Via-point of the detour: midpoint shifted north-east by a fixed offset
pub fn detour_via(start: LatLng, end: LatLng) -> LatLng {
    let mid = midpoint(start, end);
    LatLng::new(mid.lat + DETOUR_OFFSET_DEG, mid.lng + DETOUR_OFFSET_DEG)
}

/// Congestion at both ends of a trip, resolved to their nearest registry entries
#[derive(Debug, Clone)]
pub struct EndpointCongestion<'a> {
    pub start: (&'a Location, CongestionEstimate),
    pub end: (&'a Location, CongestionEstimate),
}

impl EndpointCongestion<'_> {
    pub fn combined_factor(&self) -> f64 {
        congestion::combined_factor(&self.start.1, &self.end.1)
    }

    pub fn any_heavy(&self) -> bool {
        self.start.1.level.is_heavy() || self.end.1.level.is_heavy()
    }

    /// Both estimates keyed by location name
    pub fn levels(&self) -> BTreeMap<String, CongestionEstimate> {
        let mut levels = BTreeMap::new();
        levels.insert(self.start.0.name.clone(), self.start.1);
        levels.insert(self.end.0.name.clone(), self.end.1);
        levels
    }
}

/// Route orchestrator
#[derive(Debug, Clone)]
pub struct Navigator {
    config: Arc<TrafficConfig>,
    requester: RouteRequester,
}

impl Navigator {
    pub fn new(config: Arc<TrafficConfig>) -> AppResult<Self> {
        let requester = RouteRequester::new(Arc::clone(&config))?;
        Ok(Self { config, requester })
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Current local time from the configured clock
    pub fn now(&self) -> NaiveDateTime {
        self.config.clock.now()
    }

    /// Entry point for untyped input (form fields, CLI args)
    pub async fn find_routes(
        &self,
        start: &str,
        end: &str,
        transport: &str,
        now: NaiveDateTime,
    ) -> AppResult<RoutePlan> {
        let (start_id, end_id) = match (parse_location_id(start), parse_location_id(end)) {
            (Ok(s), Ok(e)) => (s, e),
            (Err(err), _) | (_, Err(err)) => {
                warn!(start = %start, end = %end, "Invalid location ids");
                return Err(err);
            }
        };

        // Unknown locations are reported before an unknown transport
        let registry = &self.config.registry;
        if let Some(missing) = [start_id, end_id].into_iter().find(|id| !registry.contains(*id)) {
            warn!(start = start_id, end = end_id, "Unknown location");
            return Err(AppError::location_not_found(missing));
        }

        let kind = transport.trim().parse::<TransportKind>().map_err(|err| {
            warn!(transport = %transport, "Invalid transport");
            err
        })?;

        self.plan(start_id, end_id, kind, now).await
    }

    /// Primary route plus a detour when either endpoint is heavy.
    ///
    /// `has_congestion` is set only when a detour was actually found.
    pub async fn plan(
        &self,
        start_id: LocationId,
        end_id: LocationId,
        kind: TransportKind,
        now: NaiveDateTime,
    ) -> AppResult<RoutePlan> {
        let registry = &self.config.registry;
        let start = registry.get(start_id).ok_or_else(|| {
            warn!(start = start_id, end = end_id, "Unknown location");
            AppError::location_not_found(start_id)
        })?;
        let end = registry.get(end_id).ok_or_else(|| {
            warn!(start = start_id, end = end_id, "Unknown location");
            AppError::location_not_found(end_id)
        })?;

        info!(from = %start.name, to = %end.name, transport = %kind, "Planning route");

        let (start_coords, end_coords) = (start.coords(), end.coords());

        let mut primary = self
            .requester
            .fetch_route(start_coords, end_coords, kind, now)
            .await
            .map_err(|e| {
                error!(code = e.code_str(), "Primary route failed: {}", e.message);
                AppError::route_unavailable(e)
            })?;

        let endpoints = self.endpoint_congestion(start_coords, end_coords, now);
        primary.time_minutes = primary.speed_adjusted_minutes / endpoints.combined_factor();
        primary.congestion_levels = endpoints.levels();

        if !endpoints.any_heavy() {
            return Ok(RoutePlan {
                primary,
                alternative: None,
                has_congestion: false,
            });
        }

        let alternative = self
            .alternative_route(start_coords, end_coords, kind, now)
            .await;
        match &alternative {
            Some(alt) => debug!(
                distance = %alt.distance_label(),
                time = %alt.time_label(),
                "Alternative route found"
            ),
            None => info!(from = %start.name, to = %end.name, "Congested trip without detour"),
        }

        Ok(RoutePlan {
            primary,
            has_congestion: alternative.is_some(),
            alternative,
        })
    }

    /// Detour through a point just north-east of the midpoint; `None` on any failure
    pub async fn alternative_route(
        &self,
        start: LatLng,
        end: LatLng,
        kind: TransportKind,
        now: NaiveDateTime,
    ) -> Option<Route> {
        let via = detour_via(start, end);

        let mut route = match self.requester.fetch_via(vec![start, via, end], kind, now).await {
            Ok(route) => route,
            Err(e) => {
                warn!(code = e.code_str(), "No alternative available: {}", e.message);
                return None;
            }
        };

        let endpoints = self.endpoint_congestion(start, end, now);
        route.time_minutes = route.speed_adjusted_minutes / endpoints.combined_factor();
        route.congestion_levels = endpoints.levels();
        route.is_alternative = true;

        // Only the start side is reported
        if endpoints.start.1.level.is_heavy() {
            route.avoided_congestion = vec![endpoints.start.0.name.clone()];
        }

        Some(route)
    }

    /// Estimates for the registry entries nearest to each endpoint
    pub fn endpoint_congestion(
        &self,
        start: LatLng,
        end: LatLng,
        now: NaiveDateTime,
    ) -> EndpointCongestion<'_> {
        let registry = &self.config.registry;
        let start_loc = registry.nearest(start);
        let end_loc = registry.nearest(end);

        EndpointCongestion {
            start: (start_loc, congestion::estimate(start_loc, now)),
            end: (end_loc, congestion::estimate(end_loc, now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use chrono::NaiveDate;

    fn navigator() -> Navigator {
        // Unreachable base URL; these tests never get past validation
        let config = TrafficConfig::default().with_osrm_base_url("http://127.0.0.1:9/route/v1");
        Navigator::new(Arc::new(config)).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_location_id() {
        assert_eq!(parse_location_id("3").unwrap(), 3);
        assert_eq!(parse_location_id(" 12 ").unwrap(), 12);
        assert!(parse_location_id("").is_err());
        assert!(parse_location_id("0").is_err());
        assert!(parse_location_id("-1").is_err());
        assert!(parse_location_id("abc").is_err());
    }

    #[test]
    fn test_detour_via() {
        let via = detour_via(LatLng::new(-3.80, 102.26), LatLng::new(-3.82, 102.28));
        assert!((via.lat - (-3.805)).abs() < 1e-9);
        assert!((via.lng - 102.275).abs() < 1e-9);
    }

    #[test]
    fn test_endpoint_congestion() {
        let nav = navigator();
        let registry = &nav.config().registry;
        let simpang_lima = registry.get(1).unwrap().coords();
        let benteng = registry.get(4).unwrap().coords();

        let endpoints = nav.endpoint_congestion(simpang_lima, benteng, at(19, 8));
        assert!(endpoints.any_heavy());
        assert_eq!(endpoints.combined_factor(), 0.4);
        assert_eq!(endpoints.levels().len(), 2);

        let quiet = nav.endpoint_congestion(simpang_lima, benteng, at(19, 22));
        assert!(!quiet.any_heavy());
        assert_eq!(quiet.combined_factor(), 1.0);

        // Same place twice collapses to a single entry
        assert_eq!(nav.endpoint_congestion(benteng, benteng, at(19, 8)).levels().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let nav = navigator();
        let now = at(19, 8);

        let err = nav.find_routes("x", "2", "mobil", now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiBadRequest);

        let err = nav.find_routes("1", "99", "mobil", now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationNotFound);
        assert!(err.message.contains("99"));

        let err = nav.find_routes("1", "2", "sepeda", now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTransport);
        assert!(!err.message.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_location_reported_before_unknown_transport() {
        let nav = navigator();
        let now = at(19, 8);

        let err = nav.find_routes("99", "2", "becak", now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationNotFound);
        assert_eq!(err.message, "unknown location id: 99");

        let err = nav.find_routes("1", "42", "becak", now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationNotFound);
        assert!(err.message.contains("42"));
    }
}
