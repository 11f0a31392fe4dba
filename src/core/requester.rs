//! Route Requester
//!
//! Asks the directions service for a route through two or more waypoints and
//! normalizes the answer into a [`Route`]: kilometres, minutes, `(lat, lng)`
//! path, turn-by-turn steps with compass headings and a congestion note per
//! maneuver. Endpoint congestion scaling happens one level up, in the navigator.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::congestion;
use crate::models::config::{LocationRegistry, TrafficConfig};
use crate::models::errors::AppResult;
use crate::models::types::{
    Heading, LatLng, Route, RouteStep, RoutingProfile, TransportKind, TransportProfile,
};
use crate::providers::osrm::{DirectionsQuery, OsrmClient, OsrmRoute, OsrmStep};
use crate::utils::constants::REFERENCE_SPEED_KMH;
use crate::utils::geo::heading_between;

const CONTINUE: &str = "Continue";
const UNNAMED_ROAD: &str = "unnamed road";
const CONDITION_UNAVAILABLE: &str = "Road condition: unavailable";

/// Directions client bound to the shared configuration
#[derive(Debug, Clone)]
pub struct RouteRequester {
    client: OsrmClient,
    config: Arc<TrafficConfig>,
}

impl RouteRequester {
    pub fn new(config: Arc<TrafficConfig>) -> AppResult<Self> {
        let client = OsrmClient::new(config.osrm_base_url.clone(), config.osrm_timeout)?;
        Ok(Self { client, config })
    }

    /// Route from `start` to `end`
    pub async fn fetch_route(
        &self,
        start: LatLng,
        end: LatLng,
        kind: TransportKind,
        now: NaiveDateTime,
    ) -> AppResult<Route> {
        self.fetch_via(vec![start, end], kind, now).await
    }

    /// Route through every waypoint in order
    pub async fn fetch_via(
        &self,
        waypoints: Vec<LatLng>,
        kind: TransportKind,
        now: NaiveDateTime,
    ) -> AppResult<Route> {
        let profile = self.config.profile(kind);
        let query = DirectionsQuery::new(
            profile.routing_profile,
            waypoints,
            profile.prefer_narrow_ways,
        );

        let outcome = self.client.fetch(&query).await;
        if outcome.used_fallback() {
            info!(transport = %kind, "Route obtained without narrow-way preference");
        }
        let raw = outcome.into_result()?;

        debug!(
            transport = %kind,
            distance_m = raw.distance,
            duration_s = raw.duration,
            "Directions received"
        );

        Ok(assemble_route(
            &raw,
            &query.waypoints,
            profile,
            &self.config.registry,
            now,
        ))
    }
}

/// Normalize a directions-service route.
///
/// `time_minutes` is left equal to the speed-adjusted duration; the caller
/// divides it by the endpoint congestion factor.
pub fn assemble_route(
    raw: &OsrmRoute,
    waypoints: &[LatLng],
    profile: &TransportProfile,
    registry: &LocationRegistry,
    now: NaiveDateTime,
) -> Route {
    let distance_km = raw.distance / 1000.0;
    let raw_minutes = raw.duration / 60.0;

    let path = raw
        .geometry
        .coordinates
        .iter()
        .map(|&pair| LatLng::from_lng_lat(pair).to_pair())
        .collect();

    let mut steps: Vec<RouteStep> = raw
        .legs
        .iter()
        .flat_map(|leg| {
            leg.steps
                .iter()
                .enumerate()
                .map(move |(i, step)| {
                    build_step(step, leg.steps.get(i + 1), profile, registry, now)
                })
        })
        .collect();

    if steps.is_empty() {
        steps.push(synthesized_step(distance_km, waypoints, profile, registry));
    }

    let adjusted = speed_adjusted_minutes(raw_minutes, distance_km, profile);

    Route {
        distance_km,
        time_minutes: adjusted,
        raw_duration_minutes: raw_minutes,
        speed_adjusted_minutes: adjusted,
        path,
        steps,
        transport: profile.kind,
        transport_icon: profile.icon,
        is_alternative: false,
        congestion_levels: BTreeMap::new(),
        avoided_congestion: Vec::new(),
    }
}

/// Rescale the service's duration to the transport's own speed.
///
/// Driving: `raw * 50 / base_speed`. Walking: never faster than
/// `distance / base_speed`.
pub fn speed_adjusted_minutes(
    raw_minutes: f64,
    distance_km: f64,
    profile: &TransportProfile,
) -> f64 {
    match profile.routing_profile {
        RoutingProfile::Driving => raw_minutes * (REFERENCE_SPEED_KMH / profile.base_speed_kmh),
        RoutingProfile::Walking => raw_minutes.max(naive_minutes(distance_km, profile)),
    }
}

/// Travel time at the profile's base speed, ignoring congestion
pub fn naive_minutes(distance_km: f64, profile: &TransportProfile) -> f64 {
    distance_km / profile.base_speed_kmh * 60.0
}

/// Per-step time at base speed, divided by the transport's own congestion factor
pub fn step_minutes(distance_km: f64, profile: &TransportProfile) -> f64 {
    naive_minutes(distance_km, profile) / profile.congestion_factor
}

fn road_name(step: &OsrmStep) -> Option<&str> {
    step.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
}

/// "Turn left onto X", the road name, or "Continue"
fn base_instruction(step: &OsrmStep) -> String {
    if step.maneuver.is_turn() {
        let side = match step.maneuver.modifier.as_deref() {
            Some(m) if m.contains("left") => "left",
            _ => "right",
        };
        return format!("Turn {} onto {}", side, road_name(step).unwrap_or(UNNAMED_ROAD));
    }

    road_name(step).unwrap_or(CONTINUE).to_string()
}

fn build_step(
    step: &OsrmStep,
    next: Option<&OsrmStep>,
    profile: &TransportProfile,
    registry: &LocationRegistry,
    now: NaiveDateTime,
) -> RouteStep {
    let here = step.maneuver.coords();
    let base = base_instruction(step);

    let (direction, instruction) = match next {
        Some(next) => {
            let heading = heading_between(here, next.maneuver.coords());
            (heading, format!("{}, heading {}", base, heading))
        }
        None => (Heading::Straight, format!("{}, continue straight", base)),
    };

    let distance_km = step.distance / 1000.0;
    let estimate = congestion::estimate(registry.nearest(here), now);

    RouteStep {
        instruction,
        direction,
        distance_km,
        time_minutes: step_minutes(distance_km, profile),
        condition: estimate.condition_text(),
    }
}

fn synthesized_step(
    distance_km: f64,
    waypoints: &[LatLng],
    profile: &TransportProfile,
    registry: &LocationRegistry,
) -> RouteStep {
    let from = waypoints.first().map(|p| registry.nearest(*p).name.as_str()).unwrap_or("start");
    let to = waypoints.last().map(|p| registry.nearest(*p).name.as_str()).unwrap_or("destination");

    RouteStep {
        instruction: format!("Move from {} to {}", from, to),
        direction: Heading::Straight,
        distance_km,
        time_minutes: naive_minutes(distance_km, profile),
        condition: CONDITION_UNAVAILABLE.to_string(),
    }
}
