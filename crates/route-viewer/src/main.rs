#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() -> Result<(), eframe_entrypoints::LaunchError> {
    route_viewer::run_native()
}
