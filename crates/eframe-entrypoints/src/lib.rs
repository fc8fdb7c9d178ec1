//! Entry points for native egui/eframe applications
//!
//! This crate provides the reusable startup path for desktop apps: a multi-threaded tokio
//! runtime that stays entered while the UI runs, `tracing` based logging, CLI parsing helpers
//! and build metadata.
//!
//! # Usage
//!
//! In your application's `lib.rs`, use the `eframe_app!` macro to define the entry point:
//!
//! ```ignore
//! eframe_entrypoints::eframe_app!(
//!     "My App Name",
//!     |cc| Ok(Box::new(MyApp::new(cc)))
//! );
//! ```
//!
//! In your `main.rs`:
//!
//! ```ignore
//! fn main() -> Result<(), eframe_entrypoints::LaunchError> {
//!     my_app::run_native()
//! }
//! ```

pub mod async_runtime;
pub mod cli;
pub mod logging;

// Re-export commonly used types
pub use cli::{get_env, parse_args};
pub use logging::setup_logging;

mod metadata;
pub use metadata::{log_version_info, short_version_info};

// Re-export eframe types commonly needed for app creation
pub use eframe;
pub use eframe::CreationContext;

/// Error an app creator may fail with, surfaced as `LaunchError::Eframe`
pub type AppCreationError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the application from starting
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to create the tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("eframe error: {0}")]
    Eframe(#[from] eframe::Error),
}

/// Define the native entry point for an eframe application.
///
/// # Arguments
///
/// * `$app_name` - A string literal with the application name (used for window title, logging, etc.)
/// * `$app_creator` - A closure that takes `&CreationContext` and returns
///   `Result<Box<dyn eframe::App>, AppCreationError>`
///
/// # Generated Code
///
/// ```ignore
/// pub fn run_native() -> Result<(), eframe_entrypoints::LaunchError> { ... }  // Call this from main.rs
/// ```
#[macro_export]
macro_rules! eframe_app {
    ($app_name:expr, $app_creator:expr) => {
        /// Run the application on native (desktop) platforms.
        ///
        /// Blocks until the window is closed.
        pub fn run_native() -> ::std::result::Result<(), $crate::LaunchError> {
            $crate::run_with_runtime($app_name, $app_creator)
        }
    };
}

/// Build the runtime and run the app inside it.
/// Use the `eframe_app!` macro instead of calling this directly.
#[doc(hidden)]
pub fn run_with_runtime(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Result<Box<dyn eframe::App>, AppCreationError>,
) -> Result<(), LaunchError> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async { native_main_impl(app_name, app_creator).await })
}

/// Internal implementation for native (desktop) entry point.
/// Use the `eframe_app!` macro instead of calling this directly.
#[doc(hidden)]
pub async fn native_main_impl(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Result<Box<dyn eframe::App>, AppCreationError>,
) -> Result<(), LaunchError> {
    // This MUST be done before any logging
    logging::setup_logging();

    log_version_info(app_name);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| app_creator(cc)),
    )?;

    tracing::info!("{} closed", app_name);
    Ok(())
}
