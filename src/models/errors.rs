//! Centralized Error Handling Module
//!
//! Setiap kegagalan punya kode error yang unik supaya log mudah dicari.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - API_xxx: request/validation errors
//! - OSRM_xxx: directions service errors
//! - ROUTE_xxx: route orchestration errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // API / Validation Errors
    // ============================================
    /// Invalid request format or missing field
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,
    /// Location id not in the registry
    LocationNotFound,
    /// Transport name is not one of the enumerated modes
    UnknownTransport,

    // ============================================
    // Directions Service Errors
    // ============================================
    /// Connection or transport-level failure
    OsrmRequestFailed,
    /// Non-2xx HTTP status
    OsrmHttpStatus,
    /// Response `code` other than "Ok"
    OsrmStatus,
    /// "Ok" response without any route
    OsrmNoRoute,
    /// Body could not be decoded
    OsrmInvalidResponse,
    /// External service timeout
    ExternalTimeout,

    // ============================================
    // Route Orchestration Errors
    // ============================================
    /// Primary route could not be obtained
    RouteUnavailable,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // API Errors
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::LocationNotFound => "API_LOCATION_NOT_FOUND",
            Self::UnknownTransport => "API_UNKNOWN_TRANSPORT",

            // Directions Service Errors
            Self::OsrmRequestFailed => "OSRM_REQUEST_FAILED",
            Self::OsrmHttpStatus => "OSRM_HTTP_STATUS",
            Self::OsrmStatus => "OSRM_STATUS",
            Self::OsrmNoRoute => "OSRM_NO_ROUTE",
            Self::OsrmInvalidResponse => "OSRM_INVALID_RESPONSE",
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",

            // Route Errors
            Self::RouteUnavailable => "ROUTE_UNAVAILABLE",

            // Configuration Errors
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::LocationNotFound | Self::UnknownTransport => 400,
            Self::ApiRateLimited => 429,
            Self::RouteUnavailable
            | Self::OsrmRequestFailed
            | Self::OsrmHttpStatus
            | Self::OsrmStatus
            | Self::OsrmNoRoute
            | Self::OsrmInvalidResponse => 502,
            Self::ExternalTimeout => 504,
            _ => 500,
        }
    }

    /// Check if the error came from the directions service
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::OsrmRequestFailed
                | Self::OsrmHttpStatus
                | Self::OsrmStatus
                | Self::OsrmNoRoute
                | Self::OsrmInvalidResponse
                | Self::ExternalTimeout
                | Self::RouteUnavailable
        )
    }

    /// Check if the error is the caller's fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ApiBadRequest | Self::LocationNotFound | Self::UnknownTransport
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Location id that does not parse as an integer
    pub fn invalid_location_id(raw: &str) -> Self {
        Self::new(
            ErrorCode::ApiBadRequest,
            format!("invalid location id: '{}'", raw),
        )
    }

    /// Location id missing from the registry
    pub fn location_not_found(id: u32) -> Self {
        Self::new(
            ErrorCode::LocationNotFound,
            format!("unknown location id: {}", id),
        )
    }

    /// Transport name outside the enumerated set
    pub fn unknown_transport(name: &str) -> Self {
        Self::new(
            ErrorCode::UnknownTransport,
            format!("unknown transport '{}' (expected motor, mobil or jalan_kaki)", name),
        )
    }

    /// Directions service answered with a non-"Ok" code
    pub fn osrm_status(code: &str, message: Option<&str>) -> Self {
        Self::new(
            ErrorCode::OsrmStatus,
            format!("directions service returned {}: {}", code, message.unwrap_or("unknown error")),
        )
    }

    /// Primary route could not be obtained
    pub fn route_unavailable(cause: AppError) -> Self {
        Self::with_source(ErrorCode::RouteUnavailable, "failed to obtain route", cause)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExternalTimeout, "Request timeout")
        } else if err.is_decode() {
            Self::new(ErrorCode::OsrmInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::OsrmRequestFailed, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::OsrmInvalidResponse, "JSON parse error", err)
    }
}
