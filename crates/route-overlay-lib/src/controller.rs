//! RouteOverlayController - keeps the map showing the latest requested route
//!
//! Requests are tagged with increasing sequence numbers. Transport calls run as spawned tasks
//! and report back over a channel; [`RouteOverlayController::poll`] applies the completions on
//! the caller's thread. Only the completion of the most recently issued request may change the
//! map or the summary: older completions are discarded when they arrive, and failures never
//! touch what is already drawn.

use crate::client::RouteClient;
use crate::model::{NodeId, RouteResult, SummaryInfo};
use crate::surface::{MapSurface, OverlayHandle, PolylineStyle};
use crate::{Result, RoutingError};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Runs a transport task to completion somewhere (usually the tokio runtime)
pub type Spawner = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// Spawner backed by `tokio::spawn`; must be called from within a runtime
pub fn tokio_spawner() -> Spawner {
    Arc::new(|task| {
        tokio::spawn(task);
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// The latest request has settled, or none was issued
    Idle,
    /// The latest request is still outstanding
    Pending,
}

/// Identity of one issued request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteTicket {
    pub seq: u64,
    pub from: NodeId,
    pub to: NodeId,
    issued_at: instant::Instant,
}

impl RouteTicket {
    pub fn issued_at(&self) -> instant::Instant {
        self.issued_at
    }
}

/// A finished transport call, tagged with the request it belongs to
#[derive(Debug)]
pub struct Completion {
    pub ticket: RouteTicket,
    pub outcome: Result<RouteResult>,
    received_at: instant::Instant,
}

impl Completion {
    pub fn new(ticket: RouteTicket, outcome: Result<RouteResult>) -> Self {
        Self {
            ticket,
            outcome,
            received_at: instant::Instant::now(),
        }
    }

    /// Time between issuing the request and receiving its result
    pub fn round_trip(&self) -> Duration {
        self.received_at
            .saturating_duration_since(self.ticket.issued_at)
    }
}

/// What applying a completion did
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    /// The route replaced whatever was on the map
    Rendered { seq: u64, summary: SummaryInfo },
    /// The latest request failed; the map is unchanged
    Failed { seq: u64, error: RoutingError },
    /// A newer request superseded this one (or the controller was reset)
    Discarded { seq: u64 },
}

/// The route currently drawn on the map
#[derive(Clone, Debug)]
pub struct DisplayedRoute {
    handle: OverlayHandle,
    ticket: RouteTicket,
    result: RouteResult,
    round_trip: Duration,
}

impl DisplayedRoute {
    pub fn handle(&self) -> OverlayHandle {
        self.handle
    }

    pub fn from(&self) -> NodeId {
        self.ticket.from
    }

    pub fn to(&self) -> NodeId {
        self.ticket.to
    }

    pub fn seq(&self) -> u64 {
        self.ticket.seq
    }

    pub fn result(&self) -> &RouteResult {
        &self.result
    }

    pub fn summary(&self) -> SummaryInfo {
        self.result.summary()
    }

    /// Client-side time from request to response
    pub fn round_trip(&self) -> Duration {
        self.round_trip
    }
}

type ErrorHandler = Box<dyn FnMut(&RoutingError) + Send>;
type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Owns the displayed route and its summary, and decides which responses get drawn
pub struct RouteOverlayController {
    client: Arc<dyn RouteClient>,
    spawner: Spawner,
    notifier: Option<Notifier>,
    error_handler: Option<ErrorHandler>,
    style: PolylineStyle,

    /// Sequence number of the most recently issued request
    last_seq: u64,
    /// Sequence number whose completion may still be rendered
    awaiting: Option<u64>,
    /// Issued requests whose completion has not been applied yet
    in_flight: usize,

    displayed: Option<DisplayedRoute>,
    summary_tx: watch::Sender<Option<SummaryInfo>>,
    last_error: Option<RoutingError>,

    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteOverlayController {
    pub fn new(client: Arc<dyn RouteClient>, spawner: Spawner) -> Self {
        let (summary_tx, _) = watch::channel(None);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            client,
            spawner,
            notifier: None,
            error_handler: None,
            style: PolylineStyle::default(),
            last_seq: 0,
            awaiting: None,
            in_flight: 0,
            displayed: None,
            summary_tx,
            last_error: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Style for route polylines drawn from now on
    pub fn with_style(mut self, style: PolylineStyle) -> Self {
        self.style = style;
        self
    }

    /// Called from the transport task after each completion is queued (e.g. to wake the UI)
    pub fn with_notifier(mut self, notifier: impl Fn() + Send + Sync + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Called with every error that belongs to the latest request
    pub fn on_error(mut self, handler: impl FnMut(&RoutingError) + Send + 'static) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Request a route; the result is applied by a later [`poll`](Self::poll)
    ///
    /// Returns the sequence number assigned to the request.
    pub fn request_route(&mut self, from: NodeId, to: NodeId) -> u64 {
        let ticket = self.begin_request(from, to);
        let request = self.client.request_route(from, to);
        let completions = self.completions_tx.clone();
        let notifier = self.notifier.clone();

        (self.spawner)(
            async move {
                let outcome = request.await;
                // The receiver lives as long as the controller; a closed channel means it is gone
                if completions.send(Completion::new(ticket, outcome)).is_ok()
                    && let Some(notifier) = notifier
                {
                    notifier();
                }
            }
            .boxed(),
        );

        ticket.seq
    }

    /// Register a new request without starting any transport call
    ///
    /// The caller is responsible for delivering the matching [`Completion`] to
    /// [`complete`](Self::complete).
    pub fn begin_request(&mut self, from: NodeId, to: NodeId) -> RouteTicket {
        self.last_seq += 1;
        self.awaiting = Some(self.last_seq);
        self.in_flight += 1;

        tracing::debug!(
            "Requesting route {} -> {} (seq {}, {} in flight)",
            from,
            to,
            self.last_seq,
            self.in_flight
        );

        RouteTicket {
            seq: self.last_seq,
            from,
            to,
            issued_at: instant::Instant::now(),
        }
    }

    /// Apply every completion that has arrived so far, in arrival order
    pub fn poll<S: MapSurface + ?Sized>(&mut self, surface: &mut S) -> Vec<CompletionOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            outcomes.push(self.complete(surface, completion));
        }
        outcomes
    }

    /// Wait for the next completion of a spawned request and apply it
    ///
    /// Returns `None` right away when nothing is in flight.
    pub async fn settle_next<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Option<CompletionOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.complete(surface, completion))
    }

    /// Apply one completion
    pub fn complete<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        completion: Completion,
    ) -> CompletionOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let seq = completion.ticket.seq;

        if self.awaiting != Some(seq) {
            tracing::debug!(
                "Discarding stale route response (seq {}, latest {})",
                seq,
                self.last_seq
            );
            return CompletionOutcome::Discarded { seq };
        }
        self.awaiting = None;

        let round_trip = completion.round_trip();
        match completion.outcome {
            Ok(result) => {
                let summary = self.render(surface, completion.ticket, result, round_trip);
                CompletionOutcome::Rendered { seq, summary }
            }
            Err(error) => {
                tracing::warn!(
                    "Route request {} -> {} failed: {}",
                    completion.ticket.from,
                    completion.ticket.to,
                    error
                );
                if let Some(handler) = self.error_handler.as_mut() {
                    handler(&error);
                }
                self.last_error = Some(error.clone());
                CompletionOutcome::Failed { seq, error }
            }
        }
    }

    /// Swap the displayed route for a new one and publish its summary
    fn render<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        ticket: RouteTicket,
        result: RouteResult,
        round_trip: Duration,
    ) -> SummaryInfo {
        #[cfg(feature = "profiling")]
        profiling::scope!("RouteOverlayController::render");

        if !surface.is_initialized() {
            tracing::warn!("Drawing a route on a map that has not been initialized");
        }

        if let Some(previous) = self.displayed.take() {
            surface.remove_overlay(previous.handle);
        }
        let handle = surface.add_polyline(&result.path, self.style);

        let summary = result.summary();
        self.summary_tx.send_replace(Some(summary));
        self.last_error = None;

        tracing::info!(
            "Route {} -> {}: {} points, {}, service time {} ({} ms round trip)",
            ticket.from,
            ticket.to,
            summary.point_count,
            summary.format_distance(),
            summary.format_computation_time(),
            round_trip.as_millis()
        );

        self.displayed = Some(DisplayedRoute {
            handle,
            ticket,
            result,
            round_trip,
        });
        surface.fit_bounds(handle);
        summary
    }

    /// Remove the displayed route and forget the summary and the last error
    ///
    /// Requests still in flight are discarded when they complete.
    pub fn reset<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(previous) = self.displayed.take() {
            surface.remove_overlay(previous.handle);
            tracing::debug!("Cleared route {} -> {}", previous.from(), previous.to());
        }
        self.awaiting = None;
        self.last_error = None;
        self.summary_tx.send_replace(None);
    }

    /// Move the camera back onto the displayed route
    ///
    /// Returns `false` when no route is displayed.
    pub fn fit_displayed<S: MapSurface + ?Sized>(&self, surface: &mut S) -> bool {
        match &self.displayed {
            Some(displayed) => {
                surface.fit_bounds(displayed.handle);
                true
            }
            None => false,
        }
    }

    /// Change the polyline style, redrawing the displayed route without moving the camera
    pub fn restyle<S: MapSurface + ?Sized>(&mut self, surface: &mut S, style: PolylineStyle) {
        if self.style == style {
            return;
        }
        self.style = style;
        if let Some(displayed) = self.displayed.as_mut() {
            surface.remove_overlay(displayed.handle);
            displayed.handle = surface.add_polyline(&displayed.result.path, style);
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.awaiting.is_some() {
            ControllerState::Pending
        } else {
            ControllerState::Idle
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn style(&self) -> PolylineStyle {
        self.style
    }

    pub fn displayed_route(&self) -> Option<&DisplayedRoute> {
        self.displayed.as_ref()
    }

    /// Summary of the displayed route, `None` when nothing is displayed
    pub fn summary(&self) -> Option<SummaryInfo> {
        *self.summary_tx.borrow()
    }

    /// Observe summary changes
    pub fn subscribe_summary(&self) -> watch::Receiver<Option<SummaryInfo>> {
        self.summary_tx.subscribe()
    }

    /// Error of the latest request, cleared by the next successful render or a reset
    pub fn last_error(&self) -> Option<&RoutingError> {
        self.last_error.as_ref()
    }
}
