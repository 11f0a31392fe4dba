//! Configuration module for Smart Traffic
//!
//! `TrafficConfig` dibangun sekali saat start dan dibagikan sebagai
//! `Arc<TrafficConfig>`. Tidak ada state global yang bisa diubah.
//! Tabel lokasi dan profil transportasi berasal dari utils/constants.rs.

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use super::types::{
    LatLng, Location, LocationId, RoutingProfile, TransportKind, TransportProfile,
};
use crate::utils::constants::{
    BENGKULU_LOCATIONS, DEFAULT_HOST, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_OSRM_BASE_URL,
    DEFAULT_PORT, DEFAULT_UTC_OFFSET_HOURS,
};
use crate::utils::geo::haversine_km;

// ============================================
// Location registry
// ============================================

/// Immutable, non-empty table of named locations
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    /// Build a registry; ids must be positive and unique
    pub fn new(locations: Vec<Location>) -> AppResult<Self> {
        if locations.is_empty() {
            return Err(AppError::invalid_config("location registry is empty"));
        }

        let mut seen = HashSet::new();
        for loc in &locations {
            if loc.id == 0 {
                return Err(AppError::invalid_config(format!(
                    "location '{}' has id 0; ids must be positive",
                    loc.name
                )));
            }
            if !seen.insert(loc.id) {
                return Err(AppError::invalid_config(format!(
                    "duplicate location id {}",
                    loc.id
                )));
            }
        }

        Ok(Self { locations })
    }

    /// The 15 Bengkulu landmarks
    pub fn bengkulu() -> Self {
        let locations = BENGKULU_LOCATIONS
            .iter()
            .map(|s| Location {
                id: s.id,
                name: s.name.to_string(),
                lat: s.lat,
                lng: s.lng,
                critical: s.critical,
                weekend_congestion: s.weekend_congestion,
            })
            .collect();

        Self { locations }
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Location closest to `coords` by great-circle distance.
    /// Ties go to the entry that comes first in registry order.
    pub fn nearest(&self, coords: LatLng) -> &Location {
        let mut best = &self.locations[0];
        let mut best_km = f64::INFINITY;

        for loc in &self.locations {
            let km = haversine_km(coords, loc.coords());
            if km < best_km {
                best_km = km;
                best = loc;
            }
        }

        best
    }

    /// Id of the nearest location
    pub fn nearest_id(&self, coords: LatLng) -> LocationId {
        self.nearest(coords).id
    }
}

// ============================================
// Transport profiles
// ============================================

/// The three transport profiles, indexed by kind
#[derive(Debug, Clone)]
pub struct TransportTable {
    motor: TransportProfile,
    mobil: TransportProfile,
    jalan_kaki: TransportProfile,
}

impl Default for TransportTable {
    fn default() -> Self {
        Self {
            motor: TransportProfile {
                kind: TransportKind::Motor,
                base_speed_kmh: 40.0,
                congestion_factor: 0.7,
                icon: "motorcycle",
                routing_profile: RoutingProfile::Driving,
                prefer_narrow_ways: true,
            },
            mobil: TransportProfile {
                kind: TransportKind::Mobil,
                base_speed_kmh: 50.0,
                congestion_factor: 0.5,
                icon: "car",
                routing_profile: RoutingProfile::Driving,
                prefer_narrow_ways: false,
            },
            jalan_kaki: TransportProfile {
                kind: TransportKind::JalanKaki,
                base_speed_kmh: 5.0,
                congestion_factor: 1.0,
                icon: "walking",
                routing_profile: RoutingProfile::Walking,
                prefer_narrow_ways: false,
            },
        }
    }
}

impl TransportTable {
    pub fn get(&self, kind: TransportKind) -> &TransportProfile {
        match kind {
            TransportKind::Motor => &self.motor,
            TransportKind::Mobil => &self.mobil,
            TransportKind::JalanKaki => &self.jalan_kaki,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransportProfile> {
        [&self.motor, &self.mobil, &self.jalan_kaki].into_iter()
    }
}

// ============================================
// Clock
// ============================================

/// Source of "now" for congestion rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    /// Wall clock shifted to a fixed UTC offset
    Local(FixedOffset),
    /// Frozen instant (tests, CLI `--at`)
    Fixed(NaiveDateTime),
}

impl Clock {
    /// Wall clock at a whole-hour offset from UTC
    pub fn local_hours(offset_hours: i32) -> AppResult<Self> {
        FixedOffset::east_opt(offset_hours * 3600)
            .map(Self::Local)
            .ok_or_else(|| {
                AppError::invalid_config(format!("invalid UTC offset: {} hours", offset_hours))
            })
    }

    /// Local wall-clock time
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::Local(offset) => Utc::now().with_timezone(offset).naive_local(),
            Self::Fixed(at) => *at,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::local_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap_or(Self::Local(Utc.fix()))
    }
}

// ============================================
// Top-level configuration
// ============================================

/// Everything the navigator and the HTTP layer need, built once at startup
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    pub registry: LocationRegistry,
    pub transports: TransportTable,
    /// Route endpoint of the directions service, without trailing profile
    pub osrm_base_url: String,
    /// `None` keeps the HTTP client's default (no timeout)
    pub osrm_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub max_concurrent_requests: usize,
    pub clock: Clock,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            registry: LocationRegistry::bengkulu(),
            transports: TransportTable::default(),
            osrm_base_url: DEFAULT_OSRM_BASE_URL.to_string(),
            osrm_timeout: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            clock: Clock::default(),
        }
    }
}

impl TrafficConfig {
    /// Load overrides from the environment
    ///
    /// - `OSRM_BASE_URL`
    /// - `OSRM_TIMEOUT_SECS`
    /// - `TRAFFIC_UTC_OFFSET_HOURS`
    /// - `PORT` (Railway) or `TRAFFIC_PORT`, `TRAFFIC_HOST`
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("OSRM_BASE_URL") {
            if !url.trim().is_empty() {
                config.osrm_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(raw) = std::env::var("OSRM_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::invalid_config(format!(
                    "OSRM_TIMEOUT_SECS must be an integer, got '{}'",
                    raw
                ))
            })?;
            config.osrm_timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(raw) = std::env::var("TRAFFIC_UTC_OFFSET_HOURS") {
            let hours: i32 = raw.trim().parse().map_err(|_| {
                AppError::invalid_config(format!(
                    "TRAFFIC_UTC_OFFSET_HOURS must be an integer, got '{}'",
                    raw
                ))
            })?;
            config.clock = Clock::local_hours(hours)?;
        }

        if let Ok(host) = std::env::var("TRAFFIC_HOST") {
            config.host = host;
        }

        // Railway uses PORT env var, fallback to TRAFFIC_PORT for local dev
        if let Ok(raw) = std::env::var("PORT").or_else(|_| std::env::var("TRAFFIC_PORT")) {
            config.port = raw.trim().parse().map_err(|_| {
                AppError::invalid_config(format!("port must be a number, got '{}'", raw))
            })?;
        }

        info!(
            osrm = %config.osrm_base_url,
            locations = config.registry.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    pub fn with_osrm_base_url(mut self, url: impl Into<String>) -> Self {
        self.osrm_base_url = url.into();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn profile(&self, kind: TransportKind) -> &TransportProfile {
        self.transports.get(kind)
    }
}
