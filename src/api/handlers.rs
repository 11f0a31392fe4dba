//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::Html,
    Form,
};
use axum::extract::rejection::FormRejection;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::types::*;
use crate::core::congestion;
use crate::core::navigator::{parse_location_id, Navigator};
use crate::models::errors::AppError;
use crate::models::types::{LocationId, RoutePlan, TransportKind};
use crate::render::{build_map_spec, render_index, render_map, PageView};
use crate::utils::telemetry::{RouteStats, RouteStatsSnapshot};

/// Shared application state
pub struct AppState {
    pub navigator: Navigator,
    pub stats: Arc<RouteStats>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(navigator: Navigator) -> Self {
        Self {
            navigator,
            stats: Arc::new(RouteStats::new()),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn status_of(err: &AppError) -> StatusCode {
    StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        locations: state.navigator.config().registry.len(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Route lookup (JSON)
// ============================================

pub async fn api_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RoutePlan>, (StatusCode, Json<ErrorBody>)> {
    let start = Instant::now();

    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Rejected route request body");
            RouteRequest::default()
        }
    };

    let (Some(from), Some(to)) = (req.start_text(), req.end_text()) else {
        let err = AppError::bad_request("start and end are required");
        state.stats.record_error(&err, elapsed_ms(start));
        return Err((StatusCode::BAD_REQUEST, Json(ErrorBody::new(err.message))));
    };

    let now = state.navigator.now();
    match state
        .navigator
        .find_routes(&from, &to, req.transport_or_default(), now)
        .await
    {
        Ok(plan) => {
            state.stats.record_plan(&plan, elapsed_ms(start));
            info!(
                start = %from,
                end = %to,
                has_congestion = plan.has_congestion,
                latency_ms = elapsed_ms(start),
                "Route served"
            );
            Ok(Json(plan))
        }
        Err(e) => {
            state.stats.record_error(&e, elapsed_ms(start));
            Err((status_of(&e), Json(ErrorBody::new(e.message))))
        }
    }
}

// ============================================
// Page
// ============================================

struct PageRequest<'a> {
    start: Option<LocationId>,
    end: Option<LocationId>,
    transport: TransportKind,
    plan: Option<&'a RoutePlan>,
    error: Option<String>,
}

fn render_page(state: &AppState, page: PageRequest<'_>, now: NaiveDateTime) -> Html<String> {
    let registry = &state.navigator.config().registry;
    let snapshot = congestion::snapshot(registry, now);
    let spec = build_map_spec(registry, &snapshot, page.start, page.end, page.plan);

    let (map_html, map_error) = match render_map(&spec) {
        Ok(html) => (html, None),
        Err(e) => {
            error!(code = e.code_str(), "Map rendering failed: {}", e.message);
            (String::new(), Some(e.message))
        }
    };

    let error = page.error.or(map_error);
    let view = PageView {
        registry,
        selected_start: page.start,
        selected_end: page.end,
        transport: page.transport,
        map_html: &map_html,
        plan: page.plan,
        error: error.as_deref(),
    };

    Html(render_index(&view))
}

pub async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let now = state.navigator.now();
    render_page(
        &state,
        PageRequest {
            start: None,
            end: None,
            transport: TransportKind::default(),
            plan: None,
            error: None,
        },
        now,
    )
}

pub async fn index_submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<RouteForm>, FormRejection>,
) -> Html<String> {
    let started = Instant::now();
    let form = form.map(|Form(f)| f).unwrap_or_default();

    let start_raw = form.start.as_deref().map(str::trim).unwrap_or("");
    let end_raw = form.end.as_deref().map(str::trim).unwrap_or("");
    let transport_raw = form
        .transport
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TRANSPORT);

    let now = state.navigator.now();
    let result = if start_raw.is_empty() && end_raw.is_empty() {
        None
    } else {
        Some(state.navigator.find_routes(start_raw, end_raw, transport_raw, now).await)
    };

    let (plan, error) = match result {
        Some(Ok(plan)) => {
            state.stats.record_plan(&plan, elapsed_ms(started));
            (Some(plan), None)
        }
        Some(Err(e)) => {
            state.stats.record_error(&e, elapsed_ms(started));
            (None, Some(e.message))
        }
        None => (None, None),
    };

    render_page(
        &state,
        PageRequest {
            start: parse_location_id(start_raw).ok(),
            end: parse_location_id(end_raw).ok(),
            transport: transport_raw.parse().unwrap_or_default(),
            plan: plan.as_ref(),
            error,
        },
        now,
    )
}

// ============================================
// Registry & Stats
// ============================================

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<LocationsData>> {
    let start = Instant::now();
    let now = state.navigator.now();
    let registry = &state.navigator.config().registry;

    let locations = congestion::snapshot(registry, now)
        .into_iter()
        .map(|(loc, est)| LocationStatus::new(loc, est))
        .collect();

    let data = LocationsData {
        evaluated_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        locations,
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<RouteStatsSnapshot>> {
    let start = Instant::now();
    let stats = state.stats.snapshot();

    info!(
        total = stats.total_requests,
        served = stats.routes_served,
        congested = stats.congested_trips,
        "Route stats requested"
    );

    Json(ApiResponse::success(
        stats,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}
