//! Geodesy helpers: great-circle distance, forward azimuth, compass points

use geo::{HaversineDistance, Point};

use crate::models::types::{Heading, LatLng};

/// Great-circle distance in kilometres
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let p1 = Point::new(a.lng, a.lat);
    let p2 = Point::new(b.lng, b.lat);
    p1.haversine_distance(&p2) / 1000.0
}

/// Initial bearing (forward azimuth) from `from` to `to`, degrees in [0, 360)
pub fn initial_bearing(from: LatLng, to: LatLng) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Quantize a bearing to one of 8 compass points: `round(bearing / 45) mod 8`
pub fn compass_point(bearing: f64) -> Heading {
    let index = (bearing.rem_euclid(360.0) / 45.0).round() as usize % 8;
    Heading::COMPASS[index]
}

/// Compass direction of travel between two points
pub fn heading_between(from: LatLng, to: LatLng) -> Heading {
    compass_point(initial_bearing(from, to))
}

/// Midpoint of two points in plain degree space
pub fn midpoint(a: LatLng, b: LatLng) -> LatLng {
    LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}
