//! API Request/Response Types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::{CongestionEstimate, Location, LocationId};

/// API Response wrapper for the `/v1` endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: ErrorCode::ApiRateLimited.as_str().to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
        }
    }
}

// ============================================
// Route lookup
// ============================================

/// `POST /api/route` body. Ids may be JSON numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub transport: Option<String>,
}

impl RouteRequest {
    pub fn start_text(&self) -> Option<String> {
        self.start.as_ref().and_then(id_text)
    }

    pub fn end_text(&self) -> Option<String> {
        self.end.as_ref().and_then(id_text)
    }

    pub fn transport_or_default(&self) -> &str {
        self.transport.as_deref().unwrap_or(DEFAULT_TRANSPORT)
    }
}

pub const DEFAULT_TRANSPORT: &str = "mobil";

/// Text form of an id; `None` for absent, null, false, zero or empty values
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Flat `{error}` body of the route endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// `POST /` form fields
#[derive(Debug, Default, Deserialize)]
pub struct RouteForm {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
}

// ============================================
// Health & Registry
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub locations: usize,
}

/// One registry entry with its congestion right now
#[derive(Debug, Serialize)]
pub struct LocationStatus {
    pub id: LocationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub critical: bool,
    pub weekend_congestion: bool,
    pub congestion: CongestionEstimate,
}

impl LocationStatus {
    pub fn new(location: &Location, congestion: CongestionEstimate) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            lat: location.lat,
            lng: location.lng,
            critical: location.critical,
            weekend_congestion: location.weekend_congestion,
            congestion,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationsData {
    /// Local time the estimates were computed for
    pub evaluated_at: String,
    pub locations: Vec<LocationStatus>,
}
