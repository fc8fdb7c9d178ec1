//! Map surface abstraction
//!
//! [`MapSurface`] is the set of primitives the controller needs from a slippy map: a viewport,
//! a tile base layer and polyline overlays addressed by explicit [`OverlayHandle`]s.
//! [`MemorySurface`] keeps all of that in memory; a renderer reads it back every frame.

use crate::model::{GeoPoint, path_bounds};
use crate::utils;
use geo::Rect;
use std::collections::BTreeMap;

/// Identifies one overlay on a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Stroke used to draw a polyline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolylineStyle {
    /// RGBA color, not premultiplied
    pub color: [u8; 4],
    /// Stroke width in pixels
    pub weight: f32,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            weight: 6.0,
        }
    }
}

/// A slippy tile base layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLayer {
    /// URL with `{z}`, `{x}`, `{y}` and optional `{s}` (subdomain) placeholders
    pub url_template: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
}

impl TileLayer {
    const SUBDOMAINS: [&'static str; 3] = ["a", "b", "c"];

    /// Expand the template for one tile
    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        let subdomain = Self::SUBDOMAINS[((x as usize) + (y as usize)) % Self::SUBDOMAINS.len()];
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Map camera: center and (fractional) zoom level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}

/// A polyline overlay as stored on a [`MemorySurface`]
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
    pub style: PolylineStyle,
    /// WGS84 bounding box, `None` when there are no points
    pub bounds: Option<Rect<f64>>,
}

/// Primitives a map must offer to host route overlays
///
/// All methods are called from a single thread of control. Removing or fitting an unknown
/// handle is a no-op.
pub trait MapSurface {
    /// Set the initial camera
    fn initialize(&mut self, center: GeoPoint, zoom: u8);

    /// Set the tile base layer
    fn add_tile_layer(&mut self, layer: TileLayer);

    /// Draw a polyline and return its handle
    fn add_polyline(&mut self, points: &[GeoPoint], style: PolylineStyle) -> OverlayHandle;

    fn remove_overlay(&mut self, handle: OverlayHandle);

    /// Move the camera so the whole overlay is visible
    fn fit_bounds(&mut self, handle: OverlayHandle);

    /// Whether `initialize` has been called
    fn is_initialized(&self) -> bool {
        true
    }
}

/// In-memory [`MapSurface`]
///
/// Camera changes are queued in `pending_viewport` until the renderer takes them, so user
/// panning in between is never overwritten by stale state.
#[derive(Debug, Default)]
pub struct MemorySurface {
    viewport: Option<Viewport>,
    pending_viewport: Option<Viewport>,
    tile_layer: Option<TileLayer>,
    overlays: BTreeMap<OverlayHandle, Polyline>,
    next_handle: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last camera set through the surface
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Camera change not yet applied by the renderer
    pub fn take_viewport_change(&mut self) -> Option<Viewport> {
        self.pending_viewport.take()
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.tile_layer.as_ref()
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&Polyline> {
        self.overlays.get(&handle)
    }

    /// Overlays in insertion order
    pub fn overlays(&self) -> impl Iterator<Item = (OverlayHandle, &Polyline)> {
        self.overlays.iter().map(|(handle, line)| (*handle, line))
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.pending_viewport = Some(viewport);
    }

    fn max_zoom(&self) -> u8 {
        self.tile_layer
            .map(|layer| layer.max_zoom)
            .unwrap_or(utils::DEFAULT_MAX_ZOOM)
    }
}

impl MapSurface for MemorySurface {
    fn initialize(&mut self, center: GeoPoint, zoom: u8) {
        tracing::debug!(
            "Map initialized at ({:.4}, {:.4}) zoom {}",
            center.lat,
            center.lon,
            zoom
        );
        self.set_viewport(Viewport {
            center,
            zoom: f64::from(zoom),
        });
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layer = Some(layer);
    }

    fn add_polyline(&mut self, points: &[GeoPoint], style: PolylineStyle) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlays.insert(
            handle,
            Polyline {
                points: points.to_vec(),
                style,
                bounds: path_bounds(points),
            },
        );
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.remove(&handle);
    }

    fn fit_bounds(&mut self, handle: OverlayHandle) {
        let Some(bounds) = self.overlays.get(&handle).and_then(|line| line.bounds) else {
            return;
        };
        let (center, zoom) = utils::fit_bounds(bounds, self.max_zoom());
        tracing::trace!(
            "Fit to bounds: ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.1}",
            bounds.min().y,
            bounds.min().x,
            bounds.max().y,
            bounds.max().x,
            zoom
        );
        self.set_viewport(Viewport { center, zoom });
    }

    fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSM: TileLayer = TileLayer {
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "© OpenStreetMap contributors",
        max_zoom: 19,
    };

    fn two_points() -> Vec<GeoPoint> {
        vec![GeoPoint::new(41.08, -73.54), GeoPoint::new(41.09, -73.53)]
    }

    #[test]
    fn test_tile_url_template() {
        assert_eq!(
            OSM.tile_url(13, 2418, 3079),
            "https://b.tile.openstreetmap.org/13/2418/3079.png"
        );
        assert_eq!(
            OSM.tile_url(0, 0, 0),
            "https://a.tile.openstreetmap.org/0/0/0.png"
        );
    }

    #[test]
    fn test_initialize_queues_viewport() {
        let mut surface = MemorySurface::new();
        assert!(!surface.is_initialized());

        surface.initialize(GeoPoint::new(41.085, -73.54), 13);
        assert!(surface.is_initialized());

        let change = surface.take_viewport_change().unwrap();
        assert_eq!(change.zoom, 13.0);
        assert!(surface.take_viewport_change().is_none());
        assert_eq!(surface.viewport(), Some(change));
    }

    #[test]
    fn test_add_and_remove_polyline() {
        let mut surface = MemorySurface::new();
        let first = surface.add_polyline(&two_points(), PolylineStyle::default());
        let second = surface.add_polyline(&two_points(), PolylineStyle::default());
        assert_ne!(first, second);
        assert_eq!(surface.overlay_count(), 2);

        surface.remove_overlay(first);
        assert_eq!(surface.overlay_count(), 1);
        assert!(surface.overlay(first).is_none());
        assert_eq!(surface.overlay(second).unwrap().points.len(), 2);

        // Unknown handles are ignored
        surface.remove_overlay(first);
        assert_eq!(surface.overlay_count(), 1);
    }

    #[test]
    fn test_fit_bounds_respects_tile_layer() {
        let mut surface = MemorySurface::new();
        surface.add_tile_layer(TileLayer { max_zoom: 10, ..OSM });
        let handle = surface.add_polyline(&two_points(), PolylineStyle::default());

        surface.fit_bounds(handle);
        let viewport = surface.take_viewport_change().unwrap();
        assert_eq!(viewport.zoom, 10.0);
        assert!((viewport.center.lon - (-73.535)).abs() < 1e-9);
    }

    #[test]
    fn test_fit_bounds_ignores_empty_and_unknown() {
        let mut surface = MemorySurface::new();
        let empty = surface.add_polyline(&[], PolylineStyle::default());
        surface.fit_bounds(empty);
        assert!(surface.take_viewport_change().is_none());

        surface.remove_overlay(empty);
        surface.fit_bounds(empty);
        assert!(surface.viewport().is_none());
    }
}
