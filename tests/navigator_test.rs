//! Integration tests for route orchestration against a mocked directions service

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use smart_traffic::{Clock, CongestionLevel, ErrorCode, Navigator, TrafficConfig, TransportKind};
use std::sync::Arc;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIMPANG_LIMA: &str = "Simpang Lima (Jl. Soekarno Hatta)";
const BENTENG: &str = "Benteng Marlborough";

/// Two-waypoint requests only
const PRIMARY_PATH: &str = r"^/route/v1/(driving|walking)/[^;]+;[^;]+$";
/// Three-waypoint (detour) requests only
const DETOUR_PATH: &str = r"^/route/v1/(driving|walking)/[^;]+;[^;]+;[^;]+$";

fn at(day: u32, hour: u32) -> NaiveDateTime {
    // 2026-10-17 is a Saturday, 2026-10-19 a Monday
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn route_body(distance: f64, duration: f64) -> serde_json::Value {
    json!({
        "code": "Ok",
        "routes": [{
            "distance": distance,
            "duration": duration,
            "geometry": { "coordinates": [[102.265986, -3.797347], [102.2508915, -3.7878833]] },
            "legs": [{ "steps": [
                { "distance": distance / 2.0, "name": "Jalan Soekarno Hatta",
                  "maneuver": { "type": "depart", "location": [102.265986, -3.797347] } },
                { "distance": distance / 2.0, "name": "Jalan Ahmad Yani",
                  "maneuver": { "type": "turn", "modifier": "left", "location": [102.2600, -3.7920] } },
                { "distance": 0.0, "name": "",
                  "maneuver": { "type": "arrive", "location": [102.2508915, -3.7878833] } }
            ]}]
        }]
    })
}

async fn mount_ok(server: &MockServer, path: &str, distance: f64, duration: f64) {
    Mock::given(method("GET"))
        .and(path_regex(path))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body(distance, duration)))
        .mount(server)
        .await;
}

fn navigator(server: &MockServer, now: NaiveDateTime) -> Navigator {
    let config = TrafficConfig::default()
        .with_osrm_base_url(format!("{}/route/v1", server.uri()))
        .with_clock(Clock::Fixed(now));
    Navigator::new(Arc::new(config)).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_heavy_start_gets_alternative() {
    let server = MockServer::start().await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;
    mount_ok(&server, DETOUR_PATH, 12_000.0, 1_500.0).await;

    let nav = navigator(&server, at(19, 8));
    let plan = nav.find_routes("1", "4", "mobil", nav.now()).await.unwrap();

    assert!(plan.has_congestion);
    let primary = &plan.primary;
    assert!(!primary.is_alternative);
    assert!(approx(primary.distance_km, 10.0));
    assert!(approx(primary.speed_adjusted_minutes, 20.0));
    // Worse endpoint is Simpang Lima in rush hour
    assert!(approx(primary.time_minutes, 20.0 / 0.4));
    assert_eq!(primary.congestion_levels[SIMPANG_LIMA].level, CongestionLevel::Padat);
    assert_eq!(primary.congestion_levels[BENTENG].level, CongestionLevel::Lancar);
    assert_eq!(primary.steps.len(), 3);
    assert_eq!(primary.steps[2].instruction, "Continue, continue straight");

    let alt = plan.alternative.as_ref().expect("alternative route");
    assert!(alt.is_alternative);
    assert!(approx(alt.distance_km, 12.0));
    assert!(approx(alt.time_minutes, 25.0 / 0.4));
    assert_eq!(alt.avoided_congestion, vec![SIMPANG_LIMA.to_string()]);
}

#[tokio::test]
async fn test_heavy_end_only_reports_no_avoided_points() {
    let server = MockServer::start().await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;
    mount_ok(&server, DETOUR_PATH, 12_000.0, 1_500.0).await;

    let nav = navigator(&server, at(19, 8));
    let plan = nav.find_routes("4", "1", "mobil", nav.now()).await.unwrap();

    assert!(plan.has_congestion);
    let alt = plan.alternative.expect("alternative route");
    assert!(alt.avoided_congestion.is_empty());

    let json = serde_json::to_value(&alt).unwrap();
    assert!(json.get("avoided_congestion").is_none());
}

#[tokio::test]
async fn test_clear_trip_has_no_alternative() {
    let server = MockServer::start().await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;
    Mock::given(method("GET"))
        .and(path_regex(DETOUR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body(1.0, 1.0)))
        .expect(0)
        .mount(&server)
        .await;

    let nav = navigator(&server, at(19, 22));
    let plan = nav.find_routes("1", "4", "mobil", nav.now()).await.unwrap();

    assert!(!plan.has_congestion);
    assert!(plan.alternative.is_none());
    assert!(approx(plan.primary.time_minutes, 20.0));

    let json = serde_json::to_value(&plan).unwrap();
    assert!(json.get("alternative").is_none());
    assert_eq!(json["has_congestion"], false);
    assert_eq!(json["primary"]["congestion_levels"][SIMPANG_LIMA]["level"], "lancar");
}

#[tokio::test]
async fn test_failed_detour_reports_plain_primary() {
    let server = MockServer::start().await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;
    Mock::given(method("GET"))
        .and(path_regex(DETOUR_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let nav = navigator(&server, at(19, 8));
    let plan = nav.find_routes("1", "4", "mobil", nav.now()).await.unwrap();

    assert!(!plan.has_congestion);
    assert!(plan.alternative.is_none());
    // The primary still carries the heavy endpoint and its slowed time
    assert!(approx(plan.primary.time_minutes, 20.0 / 0.4));
    assert_eq!(plan.primary.congestion_levels[SIMPANG_LIMA].level, CongestionLevel::Padat);

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["has_congestion"], false);
    assert!(json.get("alternative").is_none());
}

#[tokio::test]
async fn test_primary_failure_is_route_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "NoRoute", "message": "Impossible route" })),
        )
        .mount(&server)
        .await;

    let nav = navigator(&server, at(19, 8));
    let err = nav.find_routes("1", "4", "mobil", nav.now()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::RouteUnavailable);
    assert_eq!(err.message, "failed to obtain route");
    assert_eq!(err.code.http_status(), 502);
}

#[tokio::test]
async fn test_motor_falls_back_to_plain_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("access", "customer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": "InvalidOptions" })),
        )
        .mount(&server)
        .await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;

    let nav = navigator(&server, at(19, 22));
    let plan = nav
        .plan(1, 4, TransportKind::Motor, nav.now())
        .await
        .unwrap();

    assert_eq!(plan.primary.transport, TransportKind::Motor);
    assert_eq!(plan.primary.transport_icon, "motorcycle");
    // 20 min at the 50 km/h reference becomes 25 min at 40 km/h
    assert!(approx(plan.primary.speed_adjusted_minutes, 25.0));
    // Per-step time uses the motorcycle's own factor: 5 km / 40 km/h * 60 / 0.7
    assert!(approx(plan.primary.steps[0].time_minutes, 5.0 / 40.0 * 60.0 / 0.7));
}

#[tokio::test]
async fn test_walking_uses_walking_profile_and_floor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/route/v1/walking/[^;]+;[^;]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body(2_000.0, 60.0)))
        .expect(1)
        .mount(&server)
        .await;

    let nav = navigator(&server, at(19, 22));
    let plan = nav.find_routes("1", "4", "jalan_kaki", nav.now()).await.unwrap();

    // 2 km at 5 km/h is 24 min, well above the service's 1 min
    assert!(approx(plan.primary.speed_adjusted_minutes, 24.0));
    assert!(approx(plan.primary.raw_duration_minutes, 1.0));
}

#[tokio::test]
async fn test_reported_time_grows_as_congestion_worsens() {
    let server = MockServer::start().await;
    mount_ok(&server, PRIMARY_PATH, 10_000.0, 1_200.0).await;
    mount_ok(&server, DETOUR_PATH, 12_000.0, 1_500.0).await;

    // Simpang Lima -> Bencoolen Mall: clear at 22:00, lunch at 13:00, rush at 08:00
    // on a Monday, weekend congestion on Saturday
    let mut times = Vec::new();
    for now in [at(19, 22), at(19, 13), at(19, 8), at(17, 10)] {
        let nav = navigator(&server, now);
        let plan = nav.find_routes("1", "2", "mobil", now).await.unwrap();
        times.push(plan.primary.time_minutes);
    }

    assert!(approx(times[0], 20.0));
    assert!(approx(times[1], 20.0 / 0.7));
    assert!(approx(times[2], 20.0 / 0.4));
    assert!(approx(times[3], 20.0 / 0.3));
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_invalid_requests_never_reach_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body(1.0, 1.0)))
        .expect(0)
        .mount(&server)
        .await;

    let nav = navigator(&server, at(19, 8));
    let now = nav.now();

    for (start, end, transport) in [
        ("0", "4", "mobil"),
        ("1", "16", "mobil"),
        ("satu", "4", "mobil"),
        ("1", "4", "becak"),
    ] {
        let err = nav.find_routes(start, end, transport, now).await.unwrap_err();
        assert!(err.code.is_validation(), "{start} {end} {transport}: {err}");
        assert!(!err.message.is_empty());
    }
}
