//! Application state management
//!
//! This module manages the UI-side state: settings that persist across runs, the route
//! request form and the error log. Route data itself lives in the overlay controller.

use crate::app::settings::Settings;
use route_overlay_lib::{NodeId, PolylineStyle, RoutingError, TileLayer};
use std::collections::VecDeque;

/// Maximum number of errors kept in the sidebar
const MAX_ERRORS: usize = 20;

/// Main application state
pub struct AppState {
    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Route request form
    pub form: RouteForm,

    /// Recent route errors, newest first
    pub errors: VecDeque<ErrorEntry>,

    /// Set by the UI, consumed once per frame by the app
    pub pending_action: Option<UserAction>,
}

/// Something the user asked for that needs the controller
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UserAction {
    RequestRoute { from: NodeId, to: NodeId },
    FitToRoute,
    ClearRoute,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Route line width in pixels
    pub line_width: f32,

    /// Draw a dark border below the route
    pub show_outline: bool,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Last requested nodes, restored into the form
    pub last_from: NodeId,
    pub last_to: NodeId,
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SidebarTab {
    Route,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    const OPEN_STREET_MAP: TileLayer = TileLayer {
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "© OpenStreetMap contributors",
        max_zoom: 19,
    };

    const OPEN_TOPO_MAP: TileLayer = TileLayer {
        url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: "© OpenTopoMap (CC-BY-SA)",
        max_zoom: 17,
    };

    pub fn layer(&self) -> TileLayer {
        match self {
            Self::OpenStreetMap => Self::OPEN_STREET_MAP,
            Self::OpenTopoMap => Self::OPEN_TOPO_MAP,
        }
    }

    /// Page linked from the attribution label
    pub fn attribution_url(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://www.openstreetmap.org/copyright",
            Self::OpenTopoMap => "https://opentopomap.org/",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// Text fields of the route request form
#[derive(Clone, Debug, Default)]
pub struct RouteForm {
    pub from: String,
    pub to: String,
}

impl RouteForm {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Both node ids, or a message naming the field that does not parse
    pub fn parse(&self) -> Result<(NodeId, NodeId), String> {
        let from = parse_node_id(&self.from).ok_or_else(|| "'From' must be a whole number".to_string())?;
        let to = parse_node_id(&self.to).ok_or_else(|| "'To' must be a whole number".to_string())?;
        Ok((from, to))
    }
}

fn parse_node_id(text: &str) -> Option<NodeId> {
    text.trim().parse::<i64>().ok().map(NodeId)
}

/// One entry of the error log
#[derive(Clone, Debug)]
pub struct ErrorEntry {
    pub from: Option<NodeId>,
    pub to: Option<NodeId>,
    pub message: String,
    pub at: instant::Instant,
}

impl ErrorEntry {
    /// Short label for the sidebar: "1 → 500: service error (HTTP 500): graph not loaded"
    pub fn label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} → {}: {}", from, to, self.message),
            _ => self.message.clone(),
        }
    }
}

impl AppState {
    /// Create new application state
    pub fn new(settings: &Settings) -> Self {
        let ui_settings = UiSettings {
            line_width: settings.line_width,
            show_outline: settings.show_outline,
            last_from: NodeId(settings.from),
            last_to: NodeId(settings.to),
            ..Default::default()
        };
        Self::with_ui_settings(ui_settings)
    }

    /// Create state from restored settings
    pub fn with_ui_settings(ui_settings: UiSettings) -> Self {
        let form = RouteForm::new(ui_settings.last_from, ui_settings.last_to);
        Self {
            ui_settings,
            form,
            errors: VecDeque::new(),
            pending_action: None,
        }
    }

    /// Polyline style matching the current settings
    pub fn route_style(&self) -> PolylineStyle {
        PolylineStyle {
            weight: self.ui_settings.line_width,
            ..Default::default()
        }
    }

    /// Validate the form and queue a route request
    pub fn submit_form(&mut self) {
        match self.form.parse() {
            Ok((from, to)) => {
                self.ui_settings.last_from = from;
                self.ui_settings.last_to = to;
                self.pending_action = Some(UserAction::RequestRoute { from, to });
            }
            Err(message) => {
                tracing::debug!("Invalid route form: {}", message);
                self.push_error(ErrorEntry {
                    from: None,
                    to: None,
                    message,
                    at: instant::Instant::now(),
                });
            }
        }
    }

    /// Record a failed route request
    pub fn record_route_error(&mut self, from: NodeId, to: NodeId, error: &RoutingError) {
        let message = match error.status {
            Some(status) => format!("{} (HTTP {}): {}", error.kind, status, error.message),
            None => error.to_string(),
        };
        self.push_error(ErrorEntry {
            from: Some(from),
            to: Some(to),
            message,
            at: instant::Instant::now(),
        });
    }

    fn push_error(&mut self, entry: ErrorEntry) {
        self.errors.push_front(entry);
        self.errors.truncate(MAX_ERRORS);
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            line_width: PolylineStyle::default().weight,
            show_outline: true,
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Route,
            last_from: NodeId(1),
            last_to: NodeId(500),
        }
    }
}

/// Format a duration in milliseconds for display
pub fn format_millis(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.0} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}
