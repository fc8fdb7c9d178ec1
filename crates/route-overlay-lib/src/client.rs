//! Routing service client
//!
//! [`RouteClient`] is the seam between the controller and the network. [`HttpRouteClient`]
//! is the production implementation: one `GET` per call, no retries, no caching, no timeout
//! beyond what the transport itself enforces.

use crate::model::{NodeId, RouteResult};
use crate::wire::{decode_route, service_error_message};
use crate::{Result, RoutingError};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::{Client, Url};

/// Future returned by [`RouteClient::request_route`]
pub type RouteFuture = BoxFuture<'static, Result<RouteResult>>;

/// Something that can compute a route between two nodes
///
/// Each call must issue exactly one request and must not depend on earlier calls; callers may
/// keep several futures alive at once.
pub trait RouteClient: Send + Sync {
    fn request_route(&self, from: NodeId, to: NodeId) -> RouteFuture;
}

/// Errors raised while building an [`HttpRouteClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid routing service URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for `GET {base}/api/route?from={from}&to={to}`
#[derive(Clone, Debug)]
pub struct HttpRouteClient {
    client: Client,
    endpoint: Url,
}

impl HttpRouteClient {
    /// Path of the route endpoint below the service base URL
    pub const ROUTE_PATH: &'static str = "api/route";

    /// Create a client for the service at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str) -> std::result::Result<Self, ClientBuildError> {
        let client = Client::builder().build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing `reqwest` client
    pub fn with_client(
        client: Client,
        base_url: &str,
    ) -> std::result::Result<Self, ClientBuildError> {
        let invalid = |reason: String| ClientBuildError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        // A trailing slash makes `join` append instead of replacing the last segment
        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(Self::ROUTE_PATH)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Fully resolved route endpoint, without query
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch(client: Client, endpoint: Url, from: NodeId, to: NodeId) -> Result<RouteResult> {
        tracing::debug!("GET {} from={} to={}", endpoint, from, to);

        let response = client
            .get(endpoint)
            .query(&[("from", from.0), ("to", to.0)])
            .send()
            .await
            .map_err(|e| RoutingError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RoutingError::transport(e.to_string()).with_status(status.as_u16()))?;

        if !status.is_success() {
            return Err(RoutingError::service(
                status.as_u16(),
                service_error_message(status.as_u16(), &body),
            ));
        }

        decode_route(&body).map_err(|e| e.with_status(status.as_u16()))
    }
}

impl RouteClient for HttpRouteClient {
    fn request_route(&self, from: NodeId, to: NodeId) -> RouteFuture {
        Self::fetch(self.client.clone(), self.endpoint.clone(), from, to).boxed()
    }
}
