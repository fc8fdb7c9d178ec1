//! Utility functions for coordinate conversions and viewport fitting

use crate::model::GeoPoint;
use geo::{Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;
pub const EARTH_SIZE_METERS: f64 = EARTH_MERCATOR_MAX - EARTH_MERCATOR_MIN;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Lowest zoom a fit will choose
pub const MIN_FIT_ZOOM: f64 = 1.0;

/// Zoom used when fitting a route without a tile layer limit
pub const DEFAULT_MAX_ZOOM: u8 = 18;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// # Arguments
/// * `lat` - Latitude in degrees (clamped to ±85.05)
/// * `lon` - Longitude in degrees (-180 to 180)
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon) in degrees
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// Center and zoom that show the whole of `bounds` (WGS84, x = lon, y = lat)
///
/// The center is the midpoint in Web Mercator space so it matches what the map draws.
/// A degenerate box (a single point) zooms all the way in to `max_zoom`. Layers that stop
/// below [`MIN_FIT_ZOOM`] always get their `max_zoom`.
pub fn fit_bounds(bounds: Rect<f64>, max_zoom: u8) -> (GeoPoint, f64) {
    let min = wgs84_to_mercator(bounds.min().y, bounds.min().x);
    let max = wgs84_to_mercator(bounds.max().y, bounds.max().x);
    let (center_lat, center_lon) =
        mercator_to_wgs84((min.x() + max.x()) / 2.0, (min.y() + max.y()) / 2.0);

    let max_span = (max.x() - min.x()).abs().max((max.y() - min.y()).abs());
    let max_zoom = f64::from(max_zoom);

    let zoom = if max_span > 0.0 {
        // Four tiles across the span, minus a little margin
        let zoom_estimate = (4.0 * EARTH_SIZE_METERS / max_span).log2() - 2.5;
        zoom_estimate.clamp(MIN_FIT_ZOOM.min(max_zoom), max_zoom)
    } else {
        max_zoom
    };

    (GeoPoint::new(center_lat, center_lon), zoom)
}
