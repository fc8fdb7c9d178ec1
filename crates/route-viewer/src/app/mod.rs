//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the route overlay
//! - Toggleable sidebar with tabs (Route and Settings)
//! - Responsive layout (sidebar from bottom on portrait displays)
//!
//! Route requests run on the tokio runtime; their results are applied to the map surface at the
//! start of each frame, and the surface is then mirrored into walkers.

mod plugin;
pub(crate) mod settings;
mod state;
mod tiles;
mod ui_panels;

use crate::app::plugin::RouteOverlayPlugin;
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider, UiSettings, UserAction};
use crate::app::tiles::LayerSource;
use crate::app::ui_panels::RouteStatus;
use eframe::egui;
use eframe_entrypoints::async_runtime;
use route_overlay_lib::{
    ClientBuildError, Completion, CompletionOutcome, ControllerState, GeoPoint, HttpRouteClient,
    MapSurface, MemorySurface, NodeId, Polyline, RouteOverlayController, RoutingError, Spawner,
};
use std::sync::Arc;
use walkers::{HttpTiles, Map, MapMemory};

/// Storage key of the persisted [`UiSettings`]
const PERSISTED_SETTINGS_KEY: &str = "persisted_settings";

/// Main application structure
pub struct RouteViewerApp {
    /// UI state (settings, form, errors)
    state: AppState,

    /// Decides which route responses reach the map
    controller: RouteOverlayController,

    /// Map primitives mutated by the controller
    surface: MemorySurface,

    /// Overlays of `surface`, shared with the map plugin
    overlays: Arc<[Polyline]>,

    /// Latest issued request, to label its errors
    latest_request: Option<(u64, NodeId, NodeId)>,

    /// Fully resolved routing endpoint, for display
    endpoint: String,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Initial map center
    home: GeoPoint,

    /// Show help overlay
    show_help: bool,
}

impl RouteViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, ClientBuildError> {
        let cli_args = Settings::from_cli();

        let mut state = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            AppState::new(&cli_args)
        } else if let Some(storage) = cc.storage {
            Self::load_persisted_settings(storage, &cli_args)
        } else {
            AppState::new(&cli_args)
        };

        let client = HttpRouteClient::new(&cli_args.api_url)?;
        let endpoint = client.endpoint().to_string();
        tracing::info!("Routing service: {}", endpoint);

        if !async_runtime::in_runtime_context() {
            tracing::warn!("No async runtime entered; route requests will fail as transport errors");
        }

        let repaint_ctx = cc.egui_ctx.clone();
        let controller = RouteOverlayController::new(Arc::new(client), runtime_spawner())
            .with_style(state.route_style())
            .with_notifier(move || repaint_ctx.request_repaint());

        // The surface is ready before any UI action can reach the controller
        let mut surface = MemorySurface::new();
        surface.initialize(cli_args.center(), cli_args.zoom);
        surface.add_tile_layer(state.ui_settings.tiles_provider.layer());

        if cli_args.request_on_start {
            let (from, to) = cli_args.initial_request();
            state.pending_action = Some(UserAction::RequestRoute { from, to });
        }

        let tiles_osm = HttpTiles::new(
            LayerSource::new(TilesProvider::OpenStreetMap),
            cc.egui_ctx.clone(),
        );
        let tiles_otm = HttpTiles::new(
            LayerSource::new(TilesProvider::OpenTopoMap),
            cc.egui_ctx.clone(),
        );

        Ok(Self {
            state,
            controller,
            surface,
            overlays: Arc::from(Vec::new()),
            latest_request: None,
            endpoint,
            tiles_osm,
            tiles_otm,
            map_memory: MapMemory::default(),
            home: cli_args.center(),
            show_help: false,
        })
    }

    /// Load persisted settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage, cli_args: &Settings) -> AppState {
        if let Some(json) = storage.get_string(PERSISTED_SETTINGS_KEY)
            && !json.is_empty()
        {
            match serde_json::from_str::<UiSettings>(&json) {
                Ok(settings) => {
                    tracing::info!("Restored settings");
                    return AppState::with_ui_settings(settings);
                }
                Err(e) => tracing::warn!("Discarding unreadable persisted settings: {}", e),
            }
        }

        tracing::info!("No persisted settings found, starting fresh");
        AppState::new(cli_args)
    }

    /// Apply every route response that arrived since the last frame
    fn process_completions(&mut self) {
        let outcomes = self.controller.poll(&mut self.surface);
        if outcomes.is_empty() {
            return;
        }

        for outcome in outcomes {
            match outcome {
                CompletionOutcome::Rendered { .. } => {}
                CompletionOutcome::Failed { seq, error } => {
                    // Only the latest request can fail visibly
                    if let Some((latest, from, to)) = self.latest_request
                        && latest == seq
                    {
                        self.state.record_route_error(from, to, &error);
                    }
                }
                CompletionOutcome::Discarded { seq } => {
                    tracing::trace!("Response {} superseded", seq);
                }
            }
        }
        self.refresh_overlays();
    }

    fn apply_action(&mut self, action: UserAction) {
        match action {
            UserAction::RequestRoute { from, to } => {
                let (seq, outcome) =
                    start_request(&mut self.controller, &mut self.surface, from, to);
                self.latest_request = Some((seq, from, to));
                if let Some(CompletionOutcome::Failed { error, .. }) = outcome {
                    self.state.record_route_error(from, to, &error);
                }
            }
            UserAction::FitToRoute => {
                self.controller.fit_displayed(&mut self.surface);
            }
            UserAction::ClearRoute => {
                self.controller.reset(&mut self.surface);
                self.refresh_overlays();
            }
        }
    }

    /// Push settings edited in the sidebar down to the controller and surface
    fn sync_settings(&mut self) {
        let style = self.state.route_style();
        if self.controller.style() != style {
            self.controller.restyle(&mut self.surface, style);
            self.refresh_overlays();
        }

        let layer = self.state.ui_settings.tiles_provider.layer();
        if self.surface.tile_layer() != Some(&layer) {
            self.surface.add_tile_layer(layer);
        }
    }

    fn refresh_overlays(&mut self) {
        self.overlays = self
            .surface
            .overlays()
            .map(|(_, line)| line.clone())
            .collect();
    }

    /// Move the walkers camera when the surface asks for it
    fn apply_viewport_change(&mut self) {
        let Some(viewport) = self.surface.take_viewport_change() else {
            return;
        };

        self.map_memory
            .center_at(walkers::lat_lon(viewport.center.lat, viewport.center.lon));
        if self.map_memory.set_zoom(viewport.zoom).is_err() {
            tracing::debug!("Zoom {:.1} rejected by the map", viewport.zoom);
        }
    }
}

/// Read-only view of the controller for the sidebar
fn route_status<'a>(controller: &RouteOverlayController, endpoint: &'a str) -> RouteStatus<'a> {
    let displayed = controller.displayed_route();
    RouteStatus {
        state: controller.state(),
        in_flight: controller.in_flight(),
        summary: controller.summary(),
        route: displayed.map(|route| (route.from(), route.to())),
        round_trip_ms: displayed.map(|route| route.round_trip().as_secs_f64() * 1000.0),
        endpoint,
    }
}

/// Issue a route request, failing it on the spot when there is no runtime to run it
fn start_request(
    controller: &mut RouteOverlayController,
    surface: &mut MemorySurface,
    from: NodeId,
    to: NodeId,
) -> (u64, Option<CompletionOutcome>) {
    if async_runtime::in_runtime_context() {
        return (controller.request_route(from, to), None);
    }

    let ticket = controller.begin_request(from, to);
    let error = RoutingError::transport("no async runtime to run the request");
    let outcome = controller.complete(surface, Completion::new(ticket, Err(error)));
    (ticket.seq, Some(outcome))
}

/// Run transport tasks on the runtime entered by `run_native`
fn runtime_spawner() -> Spawner {
    Arc::new(|task| {
        async_runtime::spawn(task);
    })
}

#[profiling::all_functions]
impl eframe::App for RouteViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });

        self.process_completions();

        if let Some(action) = self.state.pending_action.take() {
            self.apply_action(action);
        }

        self.sync_settings();
        self.apply_viewport_change();

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        let status = route_status(&self.controller, &self.endpoint);
        ui_panels::render_sidebar(ctx, &mut self.state, &status);
        let pending = status.state == ControllerState::Pending;
        let in_flight = status.in_flight;

        // Capture values we need before the closure
        let route_plugin =
            RouteOverlayPlugin::new(self.overlays.clone(), self.state.ui_settings.show_outline);
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.layer().attribution;
        let home = walkers::lat_lon(self.home.lat, self.home.lon);

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(Some(tiles), &mut self.map_memory, home).with_plugin(route_plugin);
                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                if pending {
                    ui_panels::pending_indicator(ui, in_flight);
                }

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // The sidebar may have queued an action for the next frame
        if self.state.pending_action.is_some() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(&self.state.ui_settings) {
            Ok(json) => {
                storage.set_string(PERSISTED_SETTINGS_KEY, json);
                tracing::debug!("Saved settings");
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_overlay_lib::RoutingErrorKind;

    fn controller() -> RouteOverlayController {
        let client = HttpRouteClient::new("http://localhost:8080").unwrap();
        RouteOverlayController::new(Arc::new(client), runtime_spawner())
    }

    #[test]
    fn test_request_without_runtime_fails_as_transport_error() {
        let mut controller = controller();
        let mut surface = MemorySurface::new();
        surface.initialize(GeoPoint::new(41.085, -73.54), 13);

        let (seq, outcome) = start_request(&mut controller, &mut surface, NodeId(1), NodeId(500));
        assert_eq!(seq, 1);
        match outcome {
            Some(CompletionOutcome::Failed { seq: 1, error }) => {
                assert_eq!(error.kind, RoutingErrorKind::Transport);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(controller.in_flight(), 0);
        assert_eq!(surface.overlay_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_request_inside_runtime_is_spawned() {
        let mut controller = controller();
        let mut surface = MemorySurface::new();

        let (seq, outcome) = start_request(&mut controller, &mut surface, NodeId(1), NodeId(500));
        assert_eq!(seq, 1);
        assert!(outcome.is_none());
        assert_eq!(controller.state(), ControllerState::Pending);
    }
}
