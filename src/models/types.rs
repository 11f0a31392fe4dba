//! Type definitions for Smart Traffic
//! Locations, transport modes, congestion estimates and normalized routes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::errors::AppError;

/// Registry identifier of a location (small positive integer)
pub type LocationId = u32;

/// Geographic point in (lat, lng) order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from the `[lng, lat]` order used on the wire by OSRM / GeoJSON
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    pub fn to_pair(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Named point of interest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Subject to weekday rush-hour and lunch-hour congestion
    pub critical: bool,
    /// Busy on Saturdays and Sundays
    pub weekend_congestion: bool,
}

impl Location {
    pub fn coords(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

// ============================================
// Transport
// ============================================

/// Transport modes offered to users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Motor,
    #[default]
    Mobil,
    JalanKaki,
}

impl TransportKind {
    pub const ALL: [TransportKind; 3] = [Self::Motor, Self::Mobil, Self::JalanKaki];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motor => "motor",
            Self::Mobil => "mobil",
            Self::JalanKaki => "jalan_kaki",
        }
    }

    /// Human label for the page
    pub fn label(&self) -> &'static str {
        match self {
            Self::Motor => "Motor",
            Self::Mobil => "Mobil",
            Self::JalanKaki => "Jalan Kaki",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motor" => Ok(Self::Motor),
            "mobil" => Ok(Self::Mobil),
            "jalan_kaki" => Ok(Self::JalanKaki),
            other => Err(AppError::unknown_transport(other)),
        }
    }
}

/// Profile name understood by the directions service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingProfile {
    Driving,
    Walking,
}

impl RoutingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
        }
    }
}

/// Speed and routing parameters of a transport mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportProfile {
    pub kind: TransportKind,
    pub base_speed_kmh: f64,
    /// Divisor applied to per-step travel times
    pub congestion_factor: f64,
    /// Font Awesome icon name
    pub icon: &'static str,
    pub routing_profile: RoutingProfile,
    pub prefer_narrow_ways: bool,
}

// ============================================
// Congestion
// ============================================

/// Coarse traffic density at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    /// Clear
    Lancar,
    /// Moderate
    Sedang,
    /// Heavy
    Padat,
}

impl CongestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lancar => "lancar",
            Self::Sedang => "sedang",
            Self::Padat => "padat",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Lancar => "clear",
            Self::Sedang => "moderate",
            Self::Padat => "heavy",
        }
    }

    /// Marker color on the map
    pub fn color(&self) -> &'static str {
        match self {
            Self::Lancar => "green",
            Self::Sedang => "orange",
            Self::Padat => "red",
        }
    }

    pub fn is_heavy(&self) -> bool {
        matches!(self, Self::Padat)
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Congestion at one location at one moment. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CongestionEstimate {
    pub level: CongestionLevel,
    /// In (0, 1]; lower means slower
    pub factor: f64,
    pub reason: &'static str,
}

impl CongestionEstimate {
    /// "Road condition: padat (rush hour)"
    pub fn condition_text(&self) -> String {
        format!("Road condition: {} ({})", self.level, self.reason)
    }
}

// ============================================
// Routes
// ============================================

/// Display direction of a maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Heading {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    #[serde(rename = "straight")]
    Straight,
}

impl Heading {
    /// Compass points clockwise from north
    pub const COMPASS: [Heading; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
            Self::Straight => "straight",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One maneuver of a route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub instruction: String,
    pub direction: Heading,
    pub distance_km: f64,
    pub time_minutes: f64,
    pub condition: String,
}

impl RouteStep {
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_km)
    }

    pub fn time_label(&self) -> String {
        format_minutes(self.time_minutes)
    }
}

/// Normalized route returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub distance_km: f64,
    /// Reported duration: speed-adjusted, then divided by the congestion factor
    pub time_minutes: f64,
    /// Duration as returned by the directions service
    pub raw_duration_minutes: f64,
    /// Duration after rescaling to the transport's speed
    pub speed_adjusted_minutes: f64,
    /// (lat, lng) pairs
    pub path: Vec<[f64; 2]>,
    pub steps: Vec<RouteStep>,
    pub transport: TransportKind,
    pub transport_icon: &'static str,
    pub is_alternative: bool,
    pub congestion_levels: BTreeMap<String, CongestionEstimate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub avoided_congestion: Vec<String>,
}

impl Route {
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_km)
    }

    pub fn time_label(&self) -> String {
        format_minutes(self.time_minutes)
    }

    /// "Primary" or "Alternative"
    pub fn kind_label(&self) -> &'static str {
        if self.is_alternative {
            "Alternative"
        } else {
            "Primary"
        }
    }
}

/// Successful route lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub primary: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative: Option<Route>,
    pub has_congestion: bool,
}

pub fn format_distance(km: f64) -> String {
    format!("{:.1} km", km)
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{:.0} min", minutes)
}
