//! UI panels for the application
//!
//! This module provides the sidebar (route request form, route summary, errors, settings),
//! the map overlays drawn on top of the tiles and the help window.

use crate::app::state::{AppState, SidebarTab, TilesProvider, UserAction, format_millis};
use egui::{Color32, RichText, Ui};
use route_overlay_lib::{ControllerState, NodeId, SummaryInfo};

/// Read-only view of the controller for one frame
pub struct RouteStatus<'a> {
    pub state: ControllerState,
    pub in_flight: usize,
    pub summary: Option<SummaryInfo>,
    /// Nodes of the displayed route
    pub route: Option<(NodeId, NodeId)>,
    pub round_trip_ms: Option<f64>,
    pub endpoint: &'a str,
}

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Small "loading route" badge in the top-left corner of the map
pub fn pending_indicator(ui: &mut Ui, in_flight: usize) {
    let rect = ui.max_rect();
    let badge_rect = egui::Rect::from_min_size(rect.left_top() + egui::vec2(10.0, 10.0), egui::vec2(170.0, 32.0));

    ui.painter()
        .rect_filled(badge_rect, 6.0, Color32::from_black_alpha(170));

    let mut child = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(badge_rect.shrink(6.0))
            .layout(egui::Layout::left_to_right(egui::Align::Center)),
    );
    child.add(egui::Spinner::new().color(Color32::WHITE));
    let text = if in_flight > 1 {
        format!("Loading route ({in_flight})")
    } else {
        "Loading route".to_string()
    };
    child.label(RichText::new(text).color(Color32::WHITE));
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState, status: &RouteStatus<'_>) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state, status));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state, status));
    }
}

/// Render the sidebar content (shared between portrait and landscape)
fn render_sidebar_content(ui: &mut Ui, state: &mut AppState, status: &RouteStatus<'_>) {
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Route,
            "🧭 Route",
        );
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Route => render_route_tab(ui, state, status),
            SidebarTab::Settings => render_settings_tab(ui, state, status),
        });
}

/// Render the Route tab
fn render_route_tab(ui: &mut Ui, state: &mut AppState, status: &RouteStatus<'_>) {
    render_request_form(ui, state);

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let has_route = status.summary.is_some();
        if ui
            .add_enabled(has_route, egui::Button::new("🎯 Fit to Route"))
            .clicked()
        {
            state.pending_action = Some(UserAction::FitToRoute);
        }
        if ui
            .add_enabled(has_route || status.state == ControllerState::Pending, egui::Button::new("🗑 Clear"))
            .clicked()
        {
            state.pending_action = Some(UserAction::ClearRoute);
        }
    });

    ui.add_space(8.0);

    if status.state == ControllerState::Pending {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new(format!("Waiting for route ({} in flight)", status.in_flight))
                    .strong()
                    .color(ui.visuals().warn_fg_color),
            );
        });
        ui.add_space(8.0);
    }

    ui.separator();

    render_summary_section(ui, status);

    ui.add_space(8.0);
    ui.separator();

    if !state.errors.is_empty() {
        ui.label(
            RichText::new(format!("⚠ Errors ({})", state.errors.len()))
                .strong()
                .color(Color32::RED),
        );
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("errors_scroll")
            .max_height(140.0)
            .show(ui, |ui| {
                for entry in &state.errors {
                    let age = entry.at.elapsed().as_secs();
                    ui.label(
                        RichText::new(format!("• {} ({}s ago)", entry.label(), age))
                            .small()
                            .color(Color32::RED),
                    );
                }
            });

        ui.add_space(4.0);
        if ui.button("Clear Errors").clicked() {
            state.errors.clear();
        }
    }
}

/// From/To fields and the request button
fn render_request_form(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("📍 Request Route").strong());
    ui.add_space(4.0);

    let mut submit = false;
    egui::Grid::new("request_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("From node:");
            let from = ui.add(egui::TextEdit::singleline(&mut state.form.from).desired_width(120.0));
            ui.end_row();

            ui.label("To node:");
            let to = ui.add(egui::TextEdit::singleline(&mut state.form.to).desired_width(120.0));
            ui.end_row();

            // Enter in either field submits
            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            submit |= enter && (from.lost_focus() || to.lost_focus());
        });

    ui.add_space(4.0);
    if ui.button("🔍 Load route").clicked() {
        submit = true;
    }

    if submit {
        state.submit_form();
    }
}

/// Render the summary of the displayed route
fn render_summary_section(ui: &mut Ui, status: &RouteStatus<'_>) {
    ui.label(RichText::new("📊 Route Summary").strong());
    ui.add_space(4.0);

    let Some(summary) = status.summary else {
        ui.label(RichText::new("No route displayed").weak());
        return;
    };

    egui::Grid::new("summary_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            if let Some((from, to)) = status.route {
                ui.label("Route:");
                ui.label(RichText::new(format!("{from} → {to}")).strong());
                ui.end_row();
            }

            ui.label("Distance:");
            ui.label(RichText::new(summary.format_distance()).strong());
            ui.end_row();

            ui.label("Computation Time:")
                .on_hover_text("Raw value from the routing service, unit as it reports it");
            ui.label(RichText::new(summary.format_computation_time()).strong());
            ui.end_row();

            ui.label("Points:");
            ui.label(RichText::new(summary.format_points()).strong());
            ui.end_row();

            if let Some(round_trip_ms) = status.round_trip_ms {
                ui.label("Round Trip:");
                let time_color = if round_trip_ms < 250.0 {
                    Color32::GREEN
                } else if round_trip_ms < 1000.0 {
                    Color32::YELLOW
                } else {
                    Color32::RED
                };
                ui.label(RichText::new(format_millis(round_trip_ms)).color(time_color));
                ui.end_row();
            }
        });
}

/// Render the Settings tab
fn render_settings_tab(ui: &mut Ui, state: &mut AppState, status: &RouteStatus<'_>) {
    ui.label(RichText::new("🎨 Route Appearance").strong());
    ui.add_space(6.0);

    egui::Grid::new("appearance_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Line Width:");
            ui.add(
                egui::Slider::new(&mut state.ui_settings.line_width, 1.0..=12.0)
                    .suffix(" px")
                    .step_by(0.5),
            );
            ui.end_row();

            ui.label("Show Outline:");
            ui.checkbox(
                &mut state.ui_settings.show_outline,
                "Dark border for visibility",
            );
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.layer().attribution)
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🔌 Routing Service").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(status.endpoint).small().monospace());

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(eframe_entrypoints::short_version_info()).small());
    ui.label(
        RichText::new("Shows the latest requested route and its statistics")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
    ui.label(RichText::new("  Enter - Load route from the form").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Route Viewer");
            ui.add_space(8.0);

            ui.label("Requests a route between two nodes and draws it on the map.");
            ui.add_space(12.0);

            ui.label(RichText::new("Requesting Routes").strong());
            ui.label("• Enter the 'From' and 'To' node ids in the sidebar");
            ui.label("• Click 'Load route' or press Enter");
            ui.label("• Only the most recent request is ever drawn");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll wheel to zoom");
            ui.label("• Click and drag to pan");
            ui.label("• 'Fit to Route' to see the whole route again");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}
