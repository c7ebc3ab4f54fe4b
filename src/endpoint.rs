/// HTTP endpoint exposing the aggregation surfaces.
///
/// A thin boundary layer for the presentation side (map UI, dashboards,
/// scripts) — no presentation logic lives here, and every request
/// recomputes from a fresh upstream fetch. Response caching belongs to a
/// reverse proxy, not this service.
///
/// Endpoints:
/// - GET /health                              - Service health check
/// - GET /stations                            - Aggregated station list
/// - GET /summary                             - Flood summary
/// - GET /risk?lat=..&lon=..[&radius=..]      - Risk assessment for a point
/// - GET /risk?location=<name>[&radius=..]    - Risk by named location
/// - GET /rivers[?detailed=true]              - Flooded river geometry

use std::collections::HashMap;

use crate::ingest::arcgis::FeedClient;
use crate::model::FeedError;
use crate::reference::ReferenceData;
use crate::{aggregate, risk, rivers, summary};

type HttpResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// Splits a query string into decoded key/value pairs.
pub fn query_params(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((key, value))
        })
        .collect()
}

/// Validated risk query: either explicit coordinates or a named location
/// resolved through the reference table.
///
/// Rejection happens here, before any upstream call, so a 400 is always
/// distinguishable from upstream failure.
pub fn parse_risk_query(
    params: &HashMap<String, String>,
    reference: &ReferenceData,
) -> Result<(f64, f64, f64), String> {
    let radius_km = match params.get("radius") {
        None => risk::DEFAULT_RADIUS_KM,
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| format!("invalid radius '{}'", raw))?,
    };

    if let Some(name) = params.get("location") {
        let location = reference
            .find_location(name)
            .ok_or_else(|| format!("unknown location '{}'", name))?;
        return Ok((location.lat, location.lon, radius_km));
    }

    let lat = parse_coord(params, "lat", -90.0..=90.0)?;
    let lon = parse_coord(params, "lon", -180.0..=180.0)?;
    Ok((lat, lon, radius_km))
}

fn parse_coord(
    params: &HashMap<String, String>,
    key: &str,
    range: std::ops::RangeInclusive<f64>,
) -> Result<f64, String> {
    let raw = params
        .get(key)
        .ok_or_else(|| format!("missing '{}' parameter", key))?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| range.contains(v))
        .ok_or_else(|| format!("invalid {} '{}'", key, raw))
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

/// Starts the endpoint server and blocks serving requests.
pub fn start_endpoint_server(
    port: u16,
    feed: FeedClient,
    reference: ReferenceData,
) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /stations - Aggregated station list");
    println!("   GET /summary - Flood summary");
    println!("   GET /risk?lat=..&lon=.. - Risk assessment");
    println!("   GET /rivers[?detailed=true] - Flooded river geometry");
    println!("   GET /health - Service health check\n");

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
        let params = query_params(query);

        let response = match path {
            "/health" => handle_health(),
            "/stations" => handle_stations(&feed),
            "/summary" => handle_summary(&feed),
            "/risk" => handle_risk(&feed, &reference, &params),
            "/rivers" => handle_rivers(&feed, &reference, &params),
            _ => create_response(
                404,
                serde_json::json!({
                    "error": "Not found",
                    "available_endpoints": ["/health", "/stations", "/summary", "/risk", "/rivers"]
                }),
            ),
        };

        if let Err(e) = request.respond(response) {
            eprintln!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

fn handle_health() -> HttpResponse {
    create_response(
        200,
        serde_json::json!({
            "status": "ok",
            "service": "lkflood_service",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

fn handle_stations(feed: &FeedClient) -> HttpResponse {
    match aggregate::collect_stations(feed) {
        Ok(stations) => json_response(200, &stations),
        Err(e) => upstream_failure(e),
    }
}

fn handle_summary(feed: &FeedClient) -> HttpResponse {
    match aggregate::collect_stations(feed) {
        Ok(stations) => json_response(200, &summary::build_summary(&stations)),
        Err(e) => upstream_failure(e),
    }
}

fn handle_risk(
    feed: &FeedClient,
    reference: &ReferenceData,
    params: &HashMap<String, String>,
) -> HttpResponse {
    let (lat, lon, radius_km) = match parse_risk_query(params, reference) {
        Ok(query) => query,
        Err(message) => return create_response(400, serde_json::json!({ "error": message })),
    };
    match risk::check_risk(feed, lat, lon, radius_km) {
        Ok(assessment) => json_response(200, &assessment),
        Err(e) => upstream_failure(e),
    }
}

fn handle_rivers(
    feed: &FeedClient,
    reference: &ReferenceData,
    params: &HashMap<String, String>,
) -> HttpResponse {
    let detailed = params
        .get("detailed")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    match rivers::flooded_rivers(feed, reference, !detailed) {
        Ok(result) => json_response(200, &result),
        Err(e) => upstream_failure(e),
    }
}

/// Upstream failures surface as 502 so callers can tell "data unavailable"
/// apart from "no flooding".
fn upstream_failure(error: FeedError) -> HttpResponse {
    create_response(
        502,
        serde_json::json!({
            "error": "upstream data unavailable",
            "detail": error.to_string()
        }),
    )
}

fn json_response<T: serde::Serialize>(status_code: u16, body: &T) -> HttpResponse {
    match serde_json::to_value(body) {
        Ok(value) => create_response(status_code, value),
        Err(e) => create_response(
            500,
            serde_json::json!({ "error": format!("serialization failed: {}", e) }),
        ),
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> HttpResponse {
    let body = json.to_string();
    let header =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
    tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(header)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
