//! JSON payloads of the routing service
//!
//! `GET /api/route` answers with
//! `{ "distance": number, "computationTime": number, "path": [{ "lat": number, "lon": number }] }`.
//! Decoding is all-or-nothing: a body that does not match this shape never yields a partial route.

use crate::model::{GeoPoint, RouteResult};
use crate::{Result, RoutingError};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResponse {
    distance: f64,
    computation_time: f64,
    path: Vec<NodeDto>,
}

#[derive(Deserialize)]
struct NodeDto {
    lat: f64,
    lon: f64,
}

/// Error body of the service (Spring style), used to extract a readable message
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Decode and validate a route response body
pub fn decode_route(body: &[u8]) -> Result<RouteResult> {
    #[cfg(feature = "profiling")]
    profiling::scope!("wire::decode_route");

    let response: RouteResponse = serde_json::from_slice(body)
        .map_err(|e| RoutingError::malformed(format!("invalid route payload: {e}")))?;

    if !response.distance.is_finite() || response.distance < 0.0 {
        return Err(RoutingError::malformed(format!(
            "distance must be a non-negative number, got {}",
            response.distance
        )));
    }
    if !response.computation_time.is_finite() || response.computation_time < 0.0 {
        return Err(RoutingError::malformed(format!(
            "computationTime must be a non-negative number, got {}",
            response.computation_time
        )));
    }

    let mut path = Vec::with_capacity(response.path.len());
    for (index, node) in response.path.into_iter().enumerate() {
        let point = GeoPoint::new(node.lat, node.lon);
        if !point.is_valid() {
            return Err(RoutingError::malformed(format!(
                "path[{index}] is out of range: ({}, {})",
                node.lat, node.lon
            )));
        }
        path.push(point);
    }

    Ok(RouteResult {
        distance: response.distance,
        computation_time_ms: response.computation_time,
        path,
    })
}

/// Best-effort readable message out of a non-success response body
pub(crate) fn service_error_message(status: u16, body: &[u8]) -> String {
    const MAX_LEN: usize = 200;

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.trim().is_empty()
    {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP {status}")
    } else if text.chars().count() > MAX_LEN {
        let truncated: String = text.chars().take(MAX_LEN).collect();
        format!("{truncated}…")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutingErrorKind;

    const SCENARIO_A: &str = r#"{
        "distance": 1234.5,
        "computationTime": 12.3,
        "path": [{"lat": 41.08, "lon": -73.54}, {"lat": 41.09, "lon": -73.53}]
    }"#;

    #[test]
    fn test_decode_valid_route() {
        let route = decode_route(SCENARIO_A.as_bytes()).unwrap();
        assert_eq!(route.distance, 1234.5);
        assert_eq!(route.computation_time_ms, 12.3);
        assert_eq!(
            route.path,
            vec![GeoPoint::new(41.08, -73.54), GeoPoint::new(41.09, -73.53)]
        );
    }

    #[test]
    fn test_decode_accepts_integer_time_and_extra_fields() {
        let body = br#"{"distance": 0, "computationTime": 4821337, "path": [], "algorithm": "duan"}"#;
        let route = decode_route(body).unwrap();
        assert_eq!(route.computation_time_ms, 4_821_337.0);
        assert!(route.path.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let err = decode_route(br#"{"distance": "x"}"#).unwrap_err();
        assert_eq!(err.kind, RoutingErrorKind::MalformedResponse);
    }

    #[test]
    fn test_decode_rejects_missing_path() {
        let err = decode_route(br#"{"distance": 1.0, "computationTime": 1.0}"#).unwrap_err();
        assert_eq!(err.kind, RoutingErrorKind::MalformedResponse);
        assert!(err.message.contains("path"));
    }

    #[test]
    fn test_decode_rejects_bad_points() {
        let missing_lon = br#"{"distance": 1.0, "computationTime": 1.0, "path": [{"lat": 1.0}]}"#;
        assert!(decode_route(missing_lon).is_err());

        let out_of_range =
            br#"{"distance": 1.0, "computationTime": 1.0, "path": [{"lat": 91.0, "lon": 0.0}]}"#;
        let err = decode_route(out_of_range).unwrap_err();
        assert!(err.message.contains("path[0]"));
    }

    #[test]
    fn test_decode_rejects_negative_statistics() {
        let body = br#"{"distance": -1.0, "computationTime": 1.0, "path": []}"#;
        assert!(decode_route(body).is_err());

        let body = br#"{"distance": 1.0, "computationTime": -0.5, "path": []}"#;
        assert!(decode_route(body).is_err());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(decode_route(b"<html>Bad Gateway</html>").is_err());
        assert!(decode_route(b"").is_err());
        // Unreachable nodes can come back as a non-JSON infinity literal
        assert!(decode_route(br#"{"distance": Infinity, "computationTime": 1, "path": []}"#).is_err());
    }

    #[test]
    fn test_service_error_message() {
        let spring = br#"{"status": 500, "error": "Internal Server Error", "message": "Grafo ainda nao carregou!"}"#;
        assert_eq!(service_error_message(500, spring), "Grafo ainda nao carregou!");

        let only_error = br#"{"status": 404, "error": "Not Found"}"#;
        assert_eq!(service_error_message(404, only_error), "Not Found");

        assert_eq!(service_error_message(502, b"  "), "HTTP 502");
        assert_eq!(service_error_message(503, b"down for maintenance"), "down for maintenance");

        let long = "x".repeat(500);
        assert_eq!(service_error_message(500, long.as_bytes()).chars().count(), 201);
    }
}
