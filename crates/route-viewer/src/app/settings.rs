use clap::Parser;
use eframe_entrypoints::parse_args;
use route_overlay_lib::{GeoPoint, HttpRouteClient, NodeId};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Viewer - Request computed routes and draw them on a map
pub struct Settings {
    /// Base URL of the routing service (the client calls `<URL>/api/route`)
    #[clap(long, default_value = "http://localhost:8080", value_parser = parse_api_url)]
    pub api_url: String,

    /// Start node of the initial route request
    #[clap(long, default_value = "1")]
    pub from: i64,

    /// End node of the initial route request
    #[clap(long, default_value = "500")]
    pub to: i64,

    /// Initial map center latitude
    #[clap(long, default_value = "41.085", allow_negative_numbers = true)]
    pub center_lat: f64,

    /// Initial map center longitude
    #[clap(long, default_value = "-73.54", allow_negative_numbers = true)]
    pub center_lon: f64,

    /// Initial map zoom level
    #[clap(long, default_value = "13", value_parser = clap::value_parser!(u8).range(0..=19))]
    pub zoom: u8,

    /// Route line width in pixels
    #[clap(long, default_value = "6.0")]
    pub line_width: f32,

    /// Show outline/border around the route for better visibility
    #[clap(long, default_value = "true", action = clap::ArgAction::Set)]
    pub show_outline: bool,

    /// Request the route between --from and --to as soon as the map is up
    #[clap(long, default_value = "false")]
    pub request_on_start: bool,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

/// Reject base URLs the route client could not use
fn parse_api_url(value: &str) -> Result<String, String> {
    HttpRouteClient::new(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}

impl Settings {
    /// Parse the command line, exiting with a usage message on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }

    pub fn initial_request(&self) -> (NodeId, NodeId) {
        (NodeId(self.from), NodeId(self.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe_entrypoints::cli::parse_args_from;

    #[test]
    fn test_defaults() {
        let settings: Settings = parse_args_from(["route-viewer"]).unwrap();
        assert_eq!(settings.api_url, "http://localhost:8080");
        assert_eq!(settings.initial_request(), (NodeId(1), NodeId(500)));
        assert_eq!(settings.center(), GeoPoint::new(41.085, -73.54));
        assert_eq!(settings.zoom, 13);
        assert_eq!(settings.line_width, 6.0);
        assert!(settings.show_outline);
        assert!(!settings.request_on_start);
        assert!(!settings.ignore_persisted);
    }

    #[test]
    fn test_overrides() {
        let settings: Settings = parse_args_from([
            "route-viewer",
            "--api-url",
            "http://routing.internal:9000/v2",
            "--from",
            "2",
            "--to",
            "600",
            "--center-lon",
            "-3.7",
            "--show-outline",
            "false",
            "--request-on-start",
        ])
        .unwrap();
        assert_eq!(settings.api_url, "http://routing.internal:9000/v2");
        assert_eq!(settings.initial_request(), (NodeId(2), NodeId(600)));
        assert_eq!(settings.center_lon, -3.7);
        assert!(!settings.show_outline);
        assert!(settings.request_on_start);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_args_from::<Settings, _, _>(["route-viewer", "--api-url", "nope"]).is_err());
        assert!(parse_args_from::<Settings, _, _>(["route-viewer", "--zoom", "25"]).is_err());
        assert!(parse_args_from::<Settings, _, _>(["route-viewer", "--from", "x"]).is_err());
    }
}
