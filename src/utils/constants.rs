//! Constants Module - Single Source of Truth
//!
//! Semua konstanta rute, tabel lokasi Bengkulu, dan profil transportasi
//! didefinisikan di sini. Modul lain membaca nilai dari sini lewat
//! `TrafficConfig`, bukan menulis ulang angka.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "Smart Traffic Bengkulu";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for requests to the directions service
pub const USER_AGENT: &str = concat!("SmartTraffic/", env!("CARGO_PKG_VERSION"));

// ============================================
// DIRECTIONS SERVICE (OSRM)
// ============================================

/// Public OSRM route endpoint (profile and coordinates are appended)
pub const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org/route/v1";

/// Query string sent with every directions request
pub const ROUTE_QUERY: &str = "overview=full&geometries=geojson&steps=true";

/// Access hint appended for transports that prefer narrow ways
pub const NARROW_WAY_HINT: &str = "access=customer";

/// Status code OSRM returns for a usable response
pub const OSRM_OK: &str = "Ok";

// ============================================
// ROUTE SHAPING
// ============================================

/// Speed (km/h) the service's driving durations are normalized against
pub const REFERENCE_SPEED_KMH: f64 = 50.0;

/// Offset (degrees, both axes) applied to the midpoint to build the detour via-point
pub const DETOUR_OFFSET_DEG: f64 = 0.005;

// ============================================
// CONGESTION RULES
// ============================================

/// Factor for weekend congestion at weekend-busy locations
pub const WEEKEND_FACTOR: f64 = 0.3;

/// Factor for weekday rush hour at critical locations
pub const RUSH_HOUR_FACTOR: f64 = 0.4;

/// Factor for lunch hour at critical locations
pub const LUNCH_HOUR_FACTOR: f64 = 0.7;

/// Factor when traffic is clear
pub const CLEAR_FACTOR: f64 = 1.0;

/// Morning rush, inclusive hours
pub const MORNING_RUSH_HOURS: (u32, u32) = (7, 9);

/// Evening rush, inclusive hours
pub const EVENING_RUSH_HOURS: (u32, u32) = (16, 19);

/// Lunch window, inclusive hours
pub const LUNCH_HOURS: (u32, u32) = (12, 14);

// ============================================
// SERVER / CLOCK DEFAULTS
// ============================================

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Default listening host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Bengkulu runs on WIB (UTC+7)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Upper bound of requests handled at the same time
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 256;

// ============================================
// MAP
// ============================================

/// Map center (lat, lng), downtown Bengkulu
pub const MAP_CENTER: (f64, f64) = (-3.7956, 102.2597);

/// Initial zoom level
pub const MAP_ZOOM: u8 = 14;

/// Heat intensity for heavy congestion
pub const HEAT_HEAVY: f64 = 0.7;

/// Heat intensity for everything else
pub const HEAT_DEFAULT: f64 = 0.3;

/// Heat layer radius in pixels
pub const HEAT_RADIUS: u32 = 15;

/// Polyline colors
pub const PRIMARY_ROUTE_COLOR: &str = "blue";
pub const ALTERNATIVE_ROUTE_COLOR: &str = "green";

// ============================================
// LOCATIONS - Bengkulu landmarks
// ============================================

/// Seed row for the location registry
pub struct LocationSeed {
    pub id: u32,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub critical: bool,
    pub weekend_congestion: bool,
}

const fn seed(
    id: u32,
    name: &'static str,
    lat: f64,
    lng: f64,
    critical: bool,
    weekend_congestion: bool,
) -> LocationSeed {
    LocationSeed {
        id,
        name,
        lat,
        lng,
        critical,
        weekend_congestion,
    }
}

/// Default registry, in display order
pub const BENGKULU_LOCATIONS: [LocationSeed; 15] = [
    seed(1, "Simpang Lima (Jl. Soekarno Hatta)", -3.797347, 102.265986, true, true),
    seed(2, "Bencoolen Mall", -3.8115102, 102.2672974, false, false),
    seed(3, "Pasar Panorama", -3.8158167, 102.2981593, true, true),
    seed(4, "Benteng Marlborough", -3.7878833, 102.2508915, false, false),
    seed(5, "Gerbang Depan UNIB", -3.7599491, 102.266921, false, false),
    seed(6, "Kantor Gubernur", -3.8209187, 102.2839724, true, false),
    seed(7, "Gerbang Belakang UNIB", -3.759583, 102.275278, false, false),
    seed(8, "Masjid Raya Baitul Izzah", -3.8208245, 102.287404, true, true),
    seed(9, "Megamall Bengkulu", -3.7933378, 102.2664841, true, true),
    seed(10, "Sport Center", -3.807732, 102.2633519, false, true),
    seed(11, "Bandara Fatmawati", -3.860507633240813, 102.33936230986484, true, false),
    seed(12, "Masjid Jamik", -3.7925189, 102.2620151, true, true),
    seed(13, "Stadion Semarak", -3.7940007, 102.2721235, false, true),
    seed(14, "Kampus IAIN", -3.7800, 102.2900, false, false),
    seed(15, "Pelabuhan Pulau Baai", -3.9073448, 102.2984753, true, false),
];
