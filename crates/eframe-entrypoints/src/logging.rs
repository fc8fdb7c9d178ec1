//! Logging setup
//!
//! Logs go through `tracing` with a `fmt` layer filtered by `RUST_LOG`. With the `profiling`
//! feature, `profiling::scope!` spans are emitted as tracing spans as well and follow the same
//! filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,eframe::native=warn,egui::context=warn,walkers=info,hyper_util=info,reqwest::connect=info,wgpu=warn,naga=warn"
    } else {
        "info,eframe=warn,egui::context=warn,wgpu=warn"
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()))
}

/// Initialize the global subscriber. Must run before any logging.
///
/// Calling it again is harmless: the second registration is ignored.
pub fn setup_logging() {
    let fmt_layer = fmt::layer().with_filter(env_filter());
    let registry = tracing_subscriber::registry().with(fmt_layer);

    match registry.try_init() {
        Ok(()) => {
            tracing::debug!(
                "Logging initialized (profiling spans {})",
                if is_profiling_enabled() { "on" } else { "off" }
            );
        }
        Err(e) => tracing::debug!("Logging already initialized: {}", e),
    }
}

/// Whether `profiling::scope!` spans are compiled in
pub fn is_profiling_enabled() -> bool {
    cfg!(feature = "profiling")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter()).is_ok());
    }

    #[test]
    fn test_setup_logging_twice() {
        setup_logging();
        setup_logging();
        tracing::info!("still logging");
    }
}
