//! Route Overlay Library - Route Requests and Single-Route Map Overlays
//!
//! This library requests computed routes from a remote routing service and keeps a map
//! surface showing exactly the most recently requested route, together with its summary
//! statistics. It has no GUI dependencies: the map is reached through the [`MapSurface`]
//! trait, and [`MemorySurface`] is a ready-made implementation that a renderer can read from.
//!
//! # Architecture
//!
//! - **[`RouteClient`]**: One asynchronous request per call, no retries or caching
//! - **[`HttpRouteClient`]**: `GET /api/route?from=..&to=..` over `reqwest`
//! - **[`MapSurface`]**: Viewport, tile layer and polyline overlay primitives
//! - **[`RouteOverlayController`]**: Sequence-numbered request tracking and atomic overlay swaps
//!
//! # Ordering
//!
//! Every request gets a monotonically increasing sequence number. Completions are applied on
//! the caller's thread, one at a time, and only the completion of the latest request may touch
//! the surface. Older completions are dropped when they arrive; nothing is cancelled in flight.

mod client;
mod controller;
mod model;
mod surface;
pub mod utils;
mod wire;

// Public API exports
pub use client::{ClientBuildError, HttpRouteClient, RouteClient, RouteFuture};
pub use controller::{
    Completion, CompletionOutcome, ControllerState, DisplayedRoute, RouteOverlayController,
    RouteTicket, Spawner, tokio_spawner,
};
pub use model::{GeoPoint, NodeId, RouteResult, SummaryInfo};
pub use surface::{
    MapSurface, MemorySurface, OverlayHandle, Polyline, PolylineStyle, TileLayer, Viewport,
};
pub use wire::decode_route;

/// Category of a failed route request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoutingErrorKind {
    /// The request never produced a response (unreachable host, reset, body read failure)
    Transport,
    /// The service answered with a non-success status
    Service,
    /// The service answered successfully but the body is not a route
    MalformedResponse,
}

impl std::fmt::Display for RoutingErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Transport => "transport error",
            Self::Service => "service error",
            Self::MalformedResponse => "malformed response",
        };
        f.write_str(name)
    }
}

/// Error produced by a route request
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RoutingError {
    pub kind: RoutingErrorKind,
    /// Human-readable cause
    pub message: String,
    /// HTTP status code, when a response was received
    pub status: Option<u16>,
}

impl RoutingError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: RoutingErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RoutingErrorKind::Service,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: RoutingErrorKind::MalformedResponse,
            message: message.into(),
            status: None,
        }
    }

    /// Attach the status code of the response that carried the bad body
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;
