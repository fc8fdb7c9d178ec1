//! Route data model
//!
//! Plain value types shared by the client, the controller and the surfaces.

use geo::{BoundingRect, Coord, LineString, Rect};

/// Opaque identifier of a routable point, interpreted only by the routing service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A WGS84 position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Coord {
            x: point.lon,
            y: point.lat,
        }
    }
}

/// Bounding box of a path in WGS84 degrees (x = longitude, y = latitude)
///
/// Returns `None` for an empty path.
pub fn path_bounds(path: &[GeoPoint]) -> Option<Rect<f64>> {
    let line: LineString<f64> = path.iter().copied().map(Coord::from).collect();
    line.bounding_rect()
}

/// A route as computed by the routing service
#[derive(Clone, Debug, PartialEq)]
pub struct RouteResult {
    /// Route length in meters
    pub distance: f64,
    /// Time the service spent computing the route, as reported by the service
    pub computation_time_ms: f64,
    /// Points in traversal order
    pub path: Vec<GeoPoint>,
}

impl RouteResult {
    pub fn point_count(&self) -> usize {
        self.path.len()
    }

    pub fn summary(&self) -> SummaryInfo {
        SummaryInfo {
            distance: self.distance,
            computation_time_ms: self.computation_time_ms,
            point_count: self.path.len(),
        }
    }
}

/// Statistics of the route currently on the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryInfo {
    pub distance: f64,
    pub computation_time_ms: f64,
    pub point_count: usize,
}

impl SummaryInfo {
    /// Format distance as human-readable string
    pub fn format_distance(&self) -> String {
        let km = self.distance / 1000.0;
        if km < 1.0 {
            format!("{:.0} m", self.distance)
        } else if km < 100.0 {
            format!("{:.2} km", km)
        } else {
            format!("{:.0} km", km)
        }
    }

    /// Computation time as the service reported it, without assuming a unit
    pub fn format_computation_time(&self) -> String {
        let value = self.computation_time_ms;
        if value >= 1000.0 {
            format_number_with_commas(value.round() as usize)
        } else {
            let text = format!("{:.3}", value);
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    }

    /// Format point count with thousands separators
    pub fn format_points(&self) -> String {
        format_number_with_commas(self.point_count)
    }
}

/// Helper to format numbers with comma separators
pub fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(41.08, -73.54).is_valid());
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.01).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_path_bounds() {
        assert!(path_bounds(&[]).is_none());

        let bounds = path_bounds(&[
            GeoPoint::new(41.08, -73.54),
            GeoPoint::new(41.09, -73.53),
            GeoPoint::new(41.07, -73.55),
        ])
        .unwrap();
        assert_eq!(bounds.min(), Coord { x: -73.55, y: 41.07 });
        assert_eq!(bounds.max(), Coord { x: -73.53, y: 41.09 });
    }

    #[test]
    fn test_summary_mirrors_result() {
        let result = RouteResult {
            distance: 1234.5,
            computation_time_ms: 12.3,
            path: vec![GeoPoint::new(41.08, -73.54), GeoPoint::new(41.09, -73.53)],
        };
        let summary = result.summary();
        assert_eq!(summary.distance, 1234.5);
        assert_eq!(summary.computation_time_ms, 12.3);
        assert_eq!(summary.point_count, 2);
    }

    #[test]
    fn test_summary_formatting() {
        let summary = SummaryInfo {
            distance: 1234.5,
            computation_time_ms: 12.3,
            point_count: 1_234_567,
        };
        assert_eq!(summary.format_distance(), "1.23 km");
        assert_eq!(summary.format_computation_time(), "12.3");
        assert_eq!(summary.format_points(), "1,234,567");

        let short = SummaryInfo {
            distance: 950.0,
            computation_time_ms: 0.5,
            point_count: 12,
        };
        assert_eq!(short.format_distance(), "950 m");
        assert_eq!(short.format_computation_time(), "0.5");
        assert_eq!(short.format_points(), "12");

        // Nanosecond-reporting services are shown verbatim, not rescaled
        let nanos = SummaryInfo {
            computation_time_ms: 4_821_337.0,
            ..short
        };
        assert_eq!(nanos.format_computation_time(), "4,821,337");
    }
}
