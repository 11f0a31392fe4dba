//! OSRM Directions Client
//!
//! Talks to the public OSRM route endpoint:
//! `{base}/{profile}/{lng1},{lat1};{lng2},{lat2}[;...]?overview=full&geometries=geojson&steps=true`
//!
//! Transports that prefer narrow ways get one attempt with `&access=customer`
//! first. If that attempt fails for any reason (connection error, non-2xx,
//! undecodable body, code other than "Ok") the plain URL is tried once.
//! The fallback is logged, never surfaced.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{LatLng, RoutingProfile};
use crate::utils::constants::{NARROW_WAY_HINT, OSRM_OK, ROUTE_QUERY, USER_AGENT};

// ============================================
// Wire types
// ============================================

/// Top-level OSRM response
#[derive(Debug, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmRoute {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub geometry: OsrmGeometry,
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

/// GeoJSON line, coordinates in `[lng, lat]` order
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmGeometry {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsrmLeg {
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmStep {
    /// Meters
    pub distance: f64,
    #[serde(default)]
    pub name: Option<String>,
    pub maneuver: OsrmManeuver,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmManeuver {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub modifier: Option<String>,
    /// `[lng, lat]`
    pub location: [f64; 2],
}

impl OsrmManeuver {
    pub fn coords(&self) -> LatLng {
        LatLng::from_lng_lat(self.location)
    }

    pub fn is_turn(&self) -> bool {
        self.kind == "turn"
    }
}

// ============================================
// Queries
// ============================================

/// A directions request through two or more waypoints
#[derive(Debug, Clone)]
pub struct DirectionsQuery {
    pub profile: RoutingProfile,
    pub waypoints: Vec<LatLng>,
    pub prefer_narrow_ways: bool,
}

impl DirectionsQuery {
    pub fn new(profile: RoutingProfile, waypoints: Vec<LatLng>, prefer_narrow_ways: bool) -> Self {
        Self {
            profile,
            waypoints,
            prefer_narrow_ways,
        }
    }

    /// Full request URL; `narrow` appends the access hint
    pub fn url(&self, base_url: &str, narrow: bool) -> String {
        let coords = self
            .waypoints
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = format!(
            "{}/{}/{}?{}",
            base_url.trim_end_matches('/'),
            self.profile.as_str(),
            coords,
            ROUTE_QUERY
        );
        if narrow {
            url.push('&');
            url.push_str(NARROW_WAY_HINT);
        }
        url
    }
}

/// Result of the two-attempt strategy
#[derive(Debug)]
pub enum FetchOutcome {
    /// First attempt succeeded
    Primary(OsrmRoute),
    /// Narrow-way attempt failed, plain attempt succeeded
    Fallback(OsrmRoute),
    /// No usable route
    Failed(AppError),
}

impl FetchOutcome {
    pub fn into_result(self) -> AppResult<OsrmRoute> {
        match self {
            Self::Primary(route) | Self::Fallback(route) => Ok(route),
            Self::Failed(err) => Err(err),
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

// ============================================
// Client
// ============================================

/// OSRM HTTP client
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    /// `timeout: None` keeps reqwest's default (no timeout)
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            AppError::with_source(ErrorCode::ConfigInvalidValue, "failed to build HTTP client", e)
        })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Single GET; any non-"Ok" outcome is an error
    pub async fn request(&self, url: &str) -> AppResult<OsrmRoute> {
        debug!(url = %url, "OSRM request");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::new(
                ErrorCode::OsrmHttpStatus,
                format!("directions service HTTP {}", status),
            ));
        }

        let body: OsrmResponse = response.json().await?;
        if body.code != OSRM_OK {
            return Err(AppError::osrm_status(&body.code, body.message.as_deref()));
        }

        body.routes.into_iter().next().ok_or_else(|| {
            AppError::new(ErrorCode::OsrmNoRoute, "directions service returned no routes")
        })
    }

    /// Narrow-way attempt (when preferred), then the plain request
    pub async fn fetch(&self, query: &DirectionsQuery) -> FetchOutcome {
        let plain_url = query.url(&self.base_url, false);

        if query.prefer_narrow_ways {
            let narrow_url = query.url(&self.base_url, true);
            match self.request(&narrow_url).await {
                Ok(route) => return FetchOutcome::Primary(route),
                Err(e) => {
                    warn!(
                        code = e.code_str(),
                        "Narrow-way request failed, falling back to default: {}",
                        e.message
                    );
                }
            }

            return match self.request(&plain_url).await {
                Ok(route) => FetchOutcome::Fallback(route),
                Err(e) => FetchOutcome::Failed(e),
            };
        }

        match self.request(&plain_url).await {
            Ok(route) => FetchOutcome::Primary(route),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok_body(distance: f64) -> serde_json::Value {
        json!({
            "code": "Ok",
            "routes": [{
                "distance": distance,
                "duration": 600.0,
                "geometry": { "coordinates": [[102.26, -3.79], [102.27, -3.80]] },
                "legs": [{ "steps": [] }]
            }]
        })
    }

    fn two_points() -> Vec<LatLng> {
        vec![LatLng::new(-3.797347, 102.265986), LatLng::new(-3.8115102, 102.2672974)]
    }

    #[test]
    fn test_url_building() {
        let query = DirectionsQuery::new(RoutingProfile::Driving, two_points(), true);
        let base = "https://router.project-osrm.org/route/v1/";

        assert_eq!(
            query.url(base, false),
            "https://router.project-osrm.org/route/v1/driving/102.265986,-3.797347;102.2672974,-3.8115102?overview=full&geometries=geojson&steps=true"
        );
        assert!(query.url(base, true).ends_with("&steps=true&access=customer"));

        let mut via = two_points();
        via.insert(1, LatLng::new(-3.8, 102.27));
        let walking = DirectionsQuery::new(RoutingProfile::Walking, via, false);
        let url = walking.url(base, false);
        assert!(url.contains("/walking/102.265986,-3.797347;102.27,-3.8;102.2672974,-3.8115102?"));
    }

    #[test]
    fn test_response_decoding() {
        let raw = json!({
            "code": "Ok",
            "routes": [{
                "distance": 1200.5,
                "duration": 180.0,
                "geometry": { "coordinates": [[102.26, -3.79]] },
                "legs": [{ "steps": [
                    { "distance": 100.0, "name": "Jalan Suprapto",
                      "maneuver": { "type": "turn", "modifier": "slight left", "location": [102.26, -3.79] } },
                    { "distance": 0.0,
                      "maneuver": { "type": "arrive", "location": [102.27, -3.80] } }
                ]}]
            }]
        });

        let body: OsrmResponse = serde_json::from_value(raw).unwrap();
        let route = &body.routes[0];
        let steps = &route.legs[0].steps;
        assert!(steps[0].maneuver.is_turn());
        assert_eq!(steps[0].maneuver.modifier.as_deref(), Some("slight left"));
        assert_eq!(steps[1].name, None);
        assert_eq!(steps[1].maneuver.coords(), LatLng::new(-3.80, 102.27));
    }

    #[tokio::test]
    async fn test_plain_request_without_narrow_preference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/route/v1/driving/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(5000.0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();
        let query = DirectionsQuery::new(RoutingProfile::Driving, two_points(), false);

        let outcome = client.fetch(&query).await;
        assert!(matches!(outcome, FetchOutcome::Primary(ref r) if r.distance == 5000.0));
    }

    #[tokio::test]
    async fn test_narrow_attempt_falls_back_on_bad_code() {
        let server = MockServer::start().await;
        let narrow_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&narrow_calls);

        // Narrow mock is mounted first so it wins whenever the hint is present
        Mock::given(method("GET"))
            .and(query_param("access", "customer"))
            .respond_with(move |_: &wiremock::Request| {
                counter.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": "InvalidQuery", "message": "unknown option" }))
            })
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(7000.0)))
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();
        let query = DirectionsQuery::new(RoutingProfile::Driving, two_points(), true);

        let outcome = client.fetch(&query).await;
        assert!(outcome.used_fallback());
        assert_eq!(outcome.into_result().unwrap().distance, 7000.0);
        assert_eq!(narrow_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_narrow_attempt_succeeds_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("access", "customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(3000.0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();
        let query = DirectionsQuery::new(RoutingProfile::Driving, two_points(), true);

        let outcome = client.fetch(&query).await;
        assert!(matches!(outcome, FetchOutcome::Primary(_)));
    }

    #[tokio::test]
    async fn test_both_attempts_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();
        let query = DirectionsQuery::new(RoutingProfile::Driving, two_points(), true);

        match client.fetch(&query).await {
            FetchOutcome::Failed(e) => assert_eq!(e.code, ErrorCode::OsrmHttpStatus),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_ok_code_and_empty_routes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/route/v1/walking/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": "NoRoute", "message": "Impossible route" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/route/v1/driving/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "code": "Ok", "routes": [] })),
            )
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();

        let walking = DirectionsQuery::new(RoutingProfile::Walking, two_points(), false);
        let err = client.fetch(&walking).await.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::OsrmStatus);
        assert!(err.message.contains("Impossible route"));

        let driving = DirectionsQuery::new(RoutingProfile::Driving, two_points(), false);
        let err = client.fetch(&driving).await.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::OsrmNoRoute);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = OsrmClient::new(format!("{}/route/v1", server.uri()), None).unwrap();
        let err = client
            .request(&format!("{}/route/v1/driving/1,1;2,2", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OsrmInvalidResponse);
    }
}
