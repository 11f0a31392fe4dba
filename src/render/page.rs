//! HTML page: route form, legend, map, and step lists

use super::escape_html;
use crate::models::config::LocationRegistry;
use crate::models::types::{CongestionLevel, LocationId, Route, RoutePlan, TransportKind};
use crate::utils::constants::APP_NAME;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css";
const FONT_AWESOME_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css";

const STYLE: &str = r#"
    .route-option { border: 1px solid #ddd; border-radius: 8px; padding: 15px; margin-bottom: 15px; }
    .transport-icon { font-size: 1.5em; margin-right: 10px; }
    .step-item { margin-left: 20px; }
    .step-details { font-size: 0.9em; color: #666; }
    .legend-swatch { width: 20px; height: 20px; margin-right: 10px; }
"#;

/// Everything the page needs for one render
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub registry: &'a LocationRegistry,
    pub selected_start: Option<LocationId>,
    pub selected_end: Option<LocationId>,
    pub transport: TransportKind,
    /// Pre-rendered map fragment, inserted verbatim
    pub map_html: &'a str,
    pub plan: Option<&'a RoutePlan>,
    pub error: Option<&'a str>,
}

fn location_select(
    name: &str,
    label: &str,
    placeholder: &str,
    view: &PageView<'_>,
    selected: Option<LocationId>,
) -> String {
    let mut html = format!(
        r#"<div class="mb-3">
  <label for="{name}" class="form-label">{label}</label>
  <select class="form-select" id="{name}" name="{name}" required>
    <option value="">{placeholder}</option>
"#
    );
    for loc in view.registry.iter() {
        let marker = if selected == Some(loc.id) { " selected" } else { "" };
        html.push_str(&format!(
            "    <option value=\"{}\"{}>{}</option>\n",
            loc.id,
            marker,
            escape_html(&loc.name)
        ));
    }
    html.push_str("  </select>\n</div>\n");
    html
}

fn transport_select(selected: TransportKind) -> String {
    let mut html = String::from(
        r#"<div class="mb-3">
  <label for="transport" class="form-label">Transport</label>
  <select class="form-select" id="transport" name="transport">
"#,
    );
    for kind in TransportKind::ALL {
        let marker = if kind == selected { " selected" } else { "" };
        html.push_str(&format!(
            "    <option value=\"{}\"{}>{}</option>\n",
            kind.as_str(),
            marker,
            kind.label()
        ));
    }
    html.push_str("  </select>\n</div>\n");
    html
}

fn legend() -> String {
    let mut html = String::new();
    for level in [CongestionLevel::Padat, CongestionLevel::Sedang, CongestionLevel::Lancar] {
        html.push_str(&format!(
            "<div class=\"d-flex align-items-center mb-2\"><div class=\"legend-swatch\" style=\"background-color: {};\"></div><span>{} ({})</span></div>\n",
            level.color(),
            level.as_str(),
            level.label()
        ));
    }
    html
}

fn route_card(route: &Route) -> String {
    let (icon, title) = if route.is_alternative {
        ("fa-random", "Alternative route")
    } else {
        ("fa-route", "Primary route")
    };

    let mut html = format!(
        r#"<div class="col-md-6">
<div class="route-option">
  <h5><i class="fas {icon}"></i> {title} <i class="fas fa-{transport_icon} transport-icon"></i></h5>
  <div class="d-flex justify-content-between"><span>{distance}</span><span>{time}</span></div>
"#,
        transport_icon = route.transport_icon,
        distance = route.distance_label(),
        time = route.time_label(),
    );

    if !route.avoided_congestion.is_empty() {
        html.push_str(&format!(
            "  <div class=\"text-muted mb-1\"><small><i class=\"fas fa-check-circle\"></i> Avoids {} congestion point(s)</small></div>\n",
            route.avoided_congestion.len()
        ));
    }

    for step in &route.steps {
        html.push_str(&format!(
            r#"  <div class="step-item mb-2">
    <strong>{}</strong>
    <div class="step-details">
      <p>Distance: {}</p>
      <p>Time: {}</p>
      <p>{}</p>
    </div>
  </div>
"#,
            escape_html(&step.instruction),
            step.distance_label(),
            step.time_label(),
            escape_html(&step.condition)
        ));
    }

    html.push_str("</div>\n</div>\n");
    html
}

fn results(plan: &RoutePlan) -> String {
    let mut html = String::from("<div class=\"container mt-4\">\n");
    let alternative = plan.alternative.as_ref().filter(|_| plan.has_congestion);

    if alternative.is_some() {
        html.push_str(
            "<div class=\"alert alert-warning\"><i class=\"fas fa-exclamation-triangle\"></i> Congestion detected on the primary route. Here is an alternative:</div>\n",
        );
    }

    html.push_str("<div class=\"row\">\n");
    html.push_str(&route_card(&plan.primary));
    if let Some(alt) = alternative {
        html.push_str(&route_card(alt));
    }
    html.push_str("</div>\n</div>\n");
    html
}

/// Complete HTML document
pub fn render_index(view: &PageView<'_>) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{app}</title>
<link rel="stylesheet" href="{fa}">
<link rel="stylesheet" href="{bs}">
<style>{style}</style>
</head>
<body>
<div class="container-fluid">
<div class="row bg-primary text-white p-4">
  <div class="col">
    <h1><i class="fas fa-traffic-light"></i> {app}</h1>
    <p class="mb-0">Congestion-aware navigation on a digital map</p>
  </div>
</div>
<div class="row mt-4">
<div class="col-md-4">
<div class="card">
  <div class="card-header bg-primary text-white"><h5 class="mb-0"><i class="fas fa-search-location"></i> Find a route</h5></div>
  <div class="card-body">
  <form method="POST" action="/">
"#,
        app = APP_NAME,
        fa = FONT_AWESOME_CSS,
        bs = BOOTSTRAP_CSS,
        style = STYLE,
    );

    html.push_str(&location_select("start", "Start", "Choose a start", view, view.selected_start));
    html.push_str(&location_select(
        "end",
        "Destination",
        "Choose a destination",
        view,
        view.selected_end,
    ));
    html.push_str(&transport_select(view.transport));

    html.push_str(
        r#"  <button type="submit" class="btn btn-primary w-100"><i class="fas fa-route"></i> Find route</button>
  </form>
  </div>
</div>
<div class="card mt-3">
  <div class="card-header bg-primary text-white"><h5 class="mb-0"><i class="fas fa-info-circle"></i> Legend</h5></div>
  <div class="card-body">
"#,
    );
    html.push_str(&legend());
    html.push_str(
        r#"  </div>
</div>
</div>
<div class="col-md-8">
<div class="card h-100">
  <div class="card-header bg-primary text-white"><h5 class="mb-0"><i class="fas fa-map-marked-alt"></i> Map</h5></div>
  <div class="card-body p-0">
"#,
    );
    html.push_str(view.map_html);
    html.push_str("\n  </div>\n</div>\n</div>\n</div>\n");

    if let Some(message) = view.error {
        html.push_str(&format!(
            "<div class=\"container mt-4\"><div class=\"alert alert-danger\"><i class=\"fas fa-exclamation-circle\"></i> {}</div></div>\n",
            escape_html(message)
        ));
    }

    if let Some(plan) = view.plan {
        html.push_str(&results(plan));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Heading, RouteStep};
    use std::collections::BTreeMap;

    fn route(is_alternative: bool, avoided: Vec<String>) -> Route {
        Route {
            distance_km: 3.0,
            time_minutes: 15.0,
            raw_duration_minutes: 6.0,
            speed_adjusted_minutes: 6.0,
            path: vec![],
            steps: vec![RouteStep {
                instruction: "Turn left onto Jl. <Merdeka>, heading N".to_string(),
                direction: Heading::N,
                distance_km: 3.0,
                time_minutes: 7.2,
                condition: "Road condition: padat (rush hour)".to_string(),
            }],
            transport: TransportKind::Motor,
            transport_icon: "motorcycle",
            is_alternative,
            congestion_levels: BTreeMap::new(),
            avoided_congestion: avoided,
        }
    }

    fn view<'a>(
        registry: &'a LocationRegistry,
        plan: Option<&'a RoutePlan>,
        error: Option<&'a str>,
    ) -> PageView<'a> {
        PageView {
            registry,
            selected_start: Some(3),
            selected_end: None,
            transport: TransportKind::Motor,
            map_html: "<div id=\"traffic-map\"></div>",
            plan,
            error,
        }
    }

    #[test]
    fn test_form_and_selection() {
        let registry = LocationRegistry::bengkulu();
        let html = render_index(&view(&registry, None, None));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<option value=\"3\" selected>Pasar Panorama</option>"));
        assert!(html.contains("<option value=\"motor\" selected>Motor</option>"));
        assert!(html.contains("<option value=\"jalan_kaki\">Jalan Kaki</option>"));
        assert!(html.contains("<div id=\"traffic-map\"></div>"));
        assert!(!html.contains("alert-danger"));
        assert!(!html.contains("class=\"route-option\""));
        // 15 locations in each of the two selects
        assert_eq!(html.matches("<option value=\"1\"").count(), 2);
    }

    #[test]
    fn test_error_banner_is_escaped() {
        let registry = LocationRegistry::bengkulu();
        let html = render_index(&view(&registry, None, Some("bad <input>")));
        assert!(html.contains("alert-danger"));
        assert!(html.contains("bad &lt;input&gt;"));
    }

    #[test]
    fn test_route_cards() {
        let registry = LocationRegistry::bengkulu();
        let plan = RoutePlan {
            primary: route(false, vec![]),
            alternative: Some(route(true, vec!["Pasar Panorama".to_string()])),
            has_congestion: true,
        };
        let html = render_index(&view(&registry, Some(&plan), None));

        assert!(html.contains("Congestion detected"));
        assert!(html.contains("Primary route"));
        assert!(html.contains("Alternative route"));
        assert!(html.contains("Avoids 1 congestion point(s)"));
        assert!(html.contains("fa-motorcycle"));
        assert!(html.contains("Jl. &lt;Merdeka&gt;"));
        assert!(html.contains("<p>Time: 7 min</p>"));
        assert!(html.contains("<p>Distance: 3.0 km</p>"));
    }

    #[test]
    fn test_plan_without_congestion_has_single_card() {
        let registry = LocationRegistry::bengkulu();
        let plan = RoutePlan {
            primary: route(false, vec![]),
            alternative: None,
            has_congestion: false,
        };
        let html = render_index(&view(&registry, Some(&plan), None));
        assert_eq!(html.matches("class=\"route-option\"").count(), 1);
        assert!(!html.contains("Congestion detected"));
    }

    #[test]
    fn test_congestion_warning_needs_an_alternative() {
        let registry = LocationRegistry::bengkulu();
        let plan = RoutePlan {
            primary: route(false, vec![]),
            alternative: None,
            has_congestion: true,
        };
        let html = render_index(&view(&registry, Some(&plan), None));
        assert_eq!(html.matches("class=\"route-option\"").count(), 1);
        assert!(!html.contains("Congestion detected"));
    }
}
