//! Walkers plugin that draws the route overlays held by the map surface

use egui::{Color32, Stroke};
use route_overlay_lib::{Polyline, PolylineStyle};
use std::sync::Arc;
use walkers::{Plugin, Projector};

/// Extra width of the outline on each side of the route, in pixels
const OUTLINE_PADDING: f32 = 1.5;

/// Plugin for rendering route polylines on the map
pub struct RouteOverlayPlugin {
    /// Snapshot of the surface overlays
    overlays: Arc<[Polyline]>,
    /// Whether to draw a dark border below each line
    show_outline: bool,
}

impl RouteOverlayPlugin {
    pub fn new(overlays: Arc<[Polyline]>, show_outline: bool) -> Self {
        Self {
            overlays,
            show_outline,
        }
    }
}

/// Stroke for the line itself
pub fn line_stroke(style: &PolylineStyle) -> Stroke {
    let [r, g, b, a] = style.color;
    Stroke::new(style.weight, Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Stroke drawn below the line when outlines are on
pub fn outline_stroke(style: &PolylineStyle) -> Stroke {
    Stroke::new(
        style.weight + 2.0 * OUTLINE_PADDING,
        Color32::from_black_alpha(160),
    )
}

impl Plugin for RouteOverlayPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RouteOverlayPlugin::run");

        let painter = ui.painter();

        for line in self.overlays.iter() {
            // Convert WGS84 coordinates to screen space
            let screen_points: Vec<egui::Pos2> = line
                .points
                .iter()
                .map(|point| {
                    let screen_vec = projector.project(walkers::lat_lon(point.lat, point.lon));
                    egui::Pos2::new(screen_vec.x, screen_vec.y)
                })
                .collect();

            // Draw the polyline if we have at least 2 points
            if screen_points.len() < 2 {
                continue;
            }
            if self.show_outline {
                painter.add(egui::Shape::line(
                    screen_points.clone(),
                    outline_stroke(&line.style),
                ));
            }
            painter.add(egui::Shape::line(screen_points, line_stroke(&line.style)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_stroke_is_red() {
        let stroke = line_stroke(&PolylineStyle::default());
        assert_eq!(stroke.width, 6.0);
        assert_eq!(stroke.color, Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_outline_is_wider_than_line() {
        let style = PolylineStyle {
            color: [0, 0, 255, 128],
            weight: 3.0,
        };
        assert_eq!(outline_stroke(&style).width, 6.0);
        assert_eq!(line_stroke(&style).color.a(), 128);
    }
}
