//! Leaflet map document
//!
//! The map is described by a serializable [`MapSpec`] and rendered as an
//! embeddable HTML fragment: a container div, the Leaflet and leaflet.heat
//! scripts from a CDN, and a small script that draws the spec.

use serde::Serialize;

use super::escape_html;
use crate::models::config::LocationRegistry;
use crate::models::errors::AppResult;
use crate::models::types::{CongestionEstimate, Location, LocationId, Route, RoutePlan};
use crate::utils::constants::{
    ALTERNATIVE_ROUTE_COLOR, HEAT_DEFAULT, HEAT_HEAVY, HEAT_RADIUS, MAP_CENTER, MAP_ZOOM,
    PRIMARY_ROUTE_COLOR,
};

const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; OpenStreetMap contributors &copy; CARTO";
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js";

const MARKER_RADIUS: u32 = 6;
const ROUTE_WEIGHT: u32 = 6;
const START_COLOR: &str = "green";
const END_COLOR: &str = "red";

#[derive(Debug, Clone, Serialize)]
pub struct MapSpec {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
    /// `[lat, lng, intensity]`
    pub heat: Vec<[f64; 3]>,
    pub heat_radius: u32,
    pub markers: Vec<CircleMarker>,
    pub routes: Vec<Polyline>,
    pub pins: Vec<Pin>,
}

/// Congestion-colored dot for one location
#[derive(Debug, Clone, Serialize)]
pub struct CircleMarker {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
    pub color: &'static str,
    /// Escaped HTML
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Polyline {
    pub path: Vec<[f64; 2]>,
    pub color: &'static str,
    pub weight: u32,
    /// Escaped HTML
    pub popup: String,
}

/// Start or end marker
#[derive(Debug, Clone, Serialize)]
pub struct Pin {
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
    /// Escaped HTML
    pub popup: String,
}

fn polyline(route: &Route, color: &'static str) -> Option<Polyline> {
    if route.path.is_empty() {
        return None;
    }
    let popup = format!(
        "{} route: {} ({})",
        route.kind_label(),
        route.distance_label(),
        route.time_label()
    );
    Some(Polyline {
        path: route.path.clone(),
        color,
        weight: ROUTE_WEIGHT,
        popup: escape_html(&popup),
    })
}

fn pin(location: &Location, label: &str, color: &'static str) -> Pin {
    Pin {
        lat: location.lat,
        lng: location.lng,
        color,
        popup: format!("<b>{}:</b> {}", label, escape_html(&location.name)),
    }
}

/// Everything the map shows, in drawing order
pub fn build_map_spec(
    registry: &LocationRegistry,
    snapshot: &[(&Location, CongestionEstimate)],
    start: Option<LocationId>,
    end: Option<LocationId>,
    plan: Option<&RoutePlan>,
) -> MapSpec {
    let heat = snapshot
        .iter()
        .map(|(loc, est)| {
            let intensity = if est.level.is_heavy() { HEAT_HEAVY } else { HEAT_DEFAULT };
            [loc.lat, loc.lng, intensity]
        })
        .collect();

    let markers = snapshot
        .iter()
        .map(|(loc, est)| CircleMarker {
            lat: loc.lat,
            lng: loc.lng,
            radius: MARKER_RADIUS,
            color: est.level.color(),
            popup: escape_html(&format!("{} - {} ({})", loc.name, est.level, est.reason)),
        })
        .collect();

    let mut routes = Vec::new();
    if let Some(plan) = plan {
        routes.extend(polyline(&plan.primary, PRIMARY_ROUTE_COLOR));
        if let Some(alt) = &plan.alternative {
            routes.extend(polyline(alt, ALTERNATIVE_ROUTE_COLOR));
        }
    }

    let mut pins = Vec::new();
    if let Some(loc) = start.and_then(|id| registry.get(id)) {
        pins.push(pin(loc, "START", START_COLOR));
    }
    if let Some(loc) = end.and_then(|id| registry.get(id)) {
        pins.push(pin(loc, "END", END_COLOR));
    }

    MapSpec {
        center: [MAP_CENTER.0, MAP_CENTER.1],
        zoom: MAP_ZOOM,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        heat,
        heat_radius: HEAT_RADIUS,
        markers,
        routes,
        pins,
    }
}

/// JSON that can sit inside a `<script>` element
fn script_json(spec: &MapSpec) -> AppResult<String> {
    let json = serde_json::to_string(spec)?;
    Ok(json.replace("</", "<\\/"))
}

/// Embeddable HTML fragment
pub fn render_map(spec: &MapSpec) -> AppResult<String> {
    let data = script_json(spec)?;

    Ok(format!(
        r#"<link rel="stylesheet" href="{css}">
<script src="{js}"></script>
<script src="{heat_js}"></script>
<div id="traffic-map" style="width: 100%; height: 600px;"></div>
<script>
(function () {{
  var spec = {data};
  var map = L.map('traffic-map').setView(spec.center, spec.zoom);
  L.tileLayer(spec.tile_url, {{ attribution: spec.attribution, subdomains: 'abcd', maxZoom: 20 }}).addTo(map);
  if (L.heatLayer) {{
    L.heatLayer(spec.heat, {{ radius: spec.heat_radius }}).addTo(map);
  }}
  spec.markers.forEach(function (m) {{
    L.circleMarker([m.lat, m.lng], {{ radius: m.radius, color: m.color, fill: true }})
      .bindPopup(m.popup).addTo(map);
  }});
  spec.routes.forEach(function (r) {{
    L.polyline(r.path, {{ color: r.color, weight: r.weight }}).bindPopup(r.popup).addTo(map);
  }});
  spec.pins.forEach(function (p) {{
    L.circleMarker([p.lat, p.lng], {{ radius: 10, color: p.color, fillColor: p.color, fillOpacity: 0.9 }})
      .bindPopup(p.popup).addTo(map);
  }});
}})();
</script>"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        heat_js = LEAFLET_HEAT_JS,
        data = data,
    ))
}
