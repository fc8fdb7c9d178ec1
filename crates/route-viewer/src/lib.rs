//! Route Viewer - Application Library
//!
//! This is the main application crate that wires the route overlay library and the entry
//! points together into the desktop route viewer.

mod app;

pub use app::RouteViewerApp;

eframe_entrypoints::eframe_app!("Route Viewer", |cc| Ok(Box::new(RouteViewerApp::new(cc)?)));
