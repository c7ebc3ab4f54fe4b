/// ArcGIS feature-service query protocol client.
///
/// Handles URL construction, pagination, spatial-intersection queries, and
/// JSON response parsing for the Irrigation Department feature layers:
///   https://services3.arcgis.com/.../{layer}/FeatureServer/0/query
///
/// Responses carry a flat, loosely-typed attribute map per feature plus
/// optional geometry (point x/y, polyline paths, or polygon rings). The
/// projection helpers at the bottom of this module are the only place the
/// loose typing is touched — callers in `ingest::gauges` and
/// `ingest::geometry` convert features into typed records before anything
/// downstream sees them. See `fixtures.rs` for annotated example payloads.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::model::FeedError;

// ---------------------------------------------------------------------------
// Layer names
// ---------------------------------------------------------------------------

/// Live water levels + thresholds, one row per gauge observation.
pub const LAYER_GAUGES: &str = "gauges_2_view";
/// Station metadata + point coordinates.
pub const LAYER_STATIONS: &str = "hydrostations";
/// River polylines (~3400 segments, paginated).
pub const LAYER_RIVERS: &str = "rivers";
/// Basin polygons.
pub const LAYER_BASINS: &str = "river_basins";

const DEFAULT_BASE_URL: &str =
    "https://services3.arcgis.com/J7ZFXmR8rSmQ3FGf/arcgis/rest/services";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client bound to a feature-service base URL.
///
/// Cheap to clone (the inner reqwest client is reference-counted), which is
/// how the parallel collection paths hand a client to each worker.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl FeedClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        FeedClient {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Builds a client honoring the `FEED_BASE_URL` environment override
    /// (read from `.env` when main has called `dotenv`).
    pub fn from_env() -> Self {
        match std::env::var("FEED_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::new(),
        }
    }

    fn layer_url(&self, layer: &str) -> String {
        format!("{}/{}/FeatureServer/0/query", self.base_url, layer)
    }

    /// Runs a single query against a layer and returns its features.
    pub fn query(&self, layer: &str, params: &QueryParams) -> Result<Vec<Feature>, FeedError> {
        let url = build_query_url(&self.layer_url(layer), params);
        self.fetch(&url)
    }

    /// Runs a query repeatedly, advancing `resultOffset` by `page_size`
    /// until the service returns a short (or empty) page.
    pub fn query_pages(
        &self,
        layer: &str,
        params: &QueryParams,
        page_size: usize,
    ) -> Result<Vec<Feature>, FeedError> {
        let mut all = Vec::new();
        let mut offset = 0usize;

        loop {
            let page_params = QueryParams {
                offset: Some(offset),
                record_count: Some(page_size),
                ..params.clone()
            };
            let page = self.query(layer, &page_params)?;
            let short = page.len() < page_size;
            all.extend(page);
            if short {
                break;
            }
            offset += page_size;
        }

        Ok(all)
    }

    /// Spatial-intersection query: returns the layer's features whose
    /// geometry intersects the given polygon (rings of [lon, lat] pairs).
    ///
    /// `tolerance` is the optional `maxAllowableOffset` generalization, in
    /// the units of the output spatial reference (degrees here).
    pub fn query_intersecting(
        &self,
        layer: &str,
        rings: &[Vec<[f64; 2]>],
        out_fields: &str,
        tolerance: Option<f64>,
    ) -> Result<Vec<Feature>, FeedError> {
        let url = build_spatial_url(&self.layer_url(layer), rings, out_fields, tolerance);
        self.fetch(&url)
    }

    fn fetch(&self, url: &str) -> Result<Vec<Feature>, FeedError> {
        let response = self
            .http
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(|e| FeedError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FeedError::Request(e.to_string()))?;

        parse_query_response(&body)
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Parameters for an attribute query. `Default` gives the common
/// "everything, with geometry" request.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub where_clause: String,
    pub out_fields: String,
    pub return_geometry: bool,
    pub order_by: Option<String>,
    pub record_count: Option<usize>,
    pub offset: Option<usize>,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            where_clause: "1=1".to_string(),
            out_fields: "*".to_string(),
            return_geometry: true,
            order_by: None,
            record_count: None,
            offset: None,
        }
    }
}

/// Builds a feature-service attribute query URL.
///
/// Always requests JSON; `outSR=4326` is included whenever geometry is
/// requested so coordinates come back as plain lon/lat.
pub fn build_query_url(layer_url: &str, params: &QueryParams) -> String {
    let mut url = format!(
        "{}?f=json&where={}&outFields={}&returnGeometry={}",
        layer_url,
        urlencoding::encode(&params.where_clause),
        params.out_fields,
        params.return_geometry,
    );
    if params.return_geometry {
        url.push_str("&outSR=4326");
    }
    if let Some(order_by) = &params.order_by {
        url.push_str("&orderByFields=");
        url.push_str(&urlencoding::encode(order_by));
    }
    if let Some(count) = params.record_count {
        url.push_str(&format!("&resultRecordCount={}", count));
    }
    if let Some(offset) = params.offset {
        url.push_str(&format!("&resultOffset={}", offset));
    }
    url
}

/// Builds a polygon-intersects query URL against a line layer.
pub fn build_spatial_url(
    layer_url: &str,
    rings: &[Vec<[f64; 2]>],
    out_fields: &str,
    tolerance: Option<f64>,
) -> String {
    let geometry = serde_json::json!({ "rings": rings }).to_string();
    let mut url = format!(
        "{}?f=json&where={}&outFields={}&returnGeometry=true&outSR=4326&inSR=4326\
         &geometry={}&geometryType=esriGeometryPolygon&spatialRel=esriSpatialRelIntersects",
        layer_url,
        urlencoding::encode("1=1"),
        out_fields,
        urlencoding::encode(&geometry),
    );
    if let Some(t) = tolerance {
        url.push_str(&format!("&maxAllowableOffset={}", t));
    }
    url
}

// ---------------------------------------------------------------------------
// Serde structures for response deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// One feature record: a flat attribute map plus optional geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
    pub geometry: Option<Geometry>,
}

/// Feature geometry. The service returns exactly one of the shapes; the
/// unused fields simply deserialize empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Polyline paths: ordered lists of [lon, lat] pairs.
    #[serde(default)]
    pub paths: Vec<Vec<[f64; 2]>>,
    /// Polygon rings: ordered lists of [lon, lat] pairs.
    #[serde(default)]
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Parses a query response body into its feature list.
///
/// The service reports some failures as a 200 response with an `error`
/// payload; those surface as `FeedError::Request` so callers treat them
/// like any other upstream failure.
pub fn parse_query_response(json: &str) -> Result<Vec<Feature>, FeedError> {
    let response: QueryResponse = serde_json::from_str(json)
        .map_err(|e| FeedError::Parse(format!("JSON deserialization failed: {}", e)))?;

    if let Some(err) = response.error {
        return Err(FeedError::Request(format!(
            "feature service error {}: {}",
            err.code, err.message
        )));
    }

    Ok(response.features)
}

// ---------------------------------------------------------------------------
// Attribute projection helpers
// ---------------------------------------------------------------------------

/// Reads a string attribute. Absent keys and JSON nulls yield `None`.
pub fn attr_str(attrs: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    attrs.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Reads a numeric attribute. The feed is inconsistent about numeric
/// typing, so string-encoded numbers are accepted too.
pub fn attr_f64(attrs: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    match attrs.get(key) {
        Some(value) => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())),
        None => None,
    }
}

/// Reads an integer attribute (epoch-millisecond timestamps).
pub fn attr_i64(attrs: &serde_json::Map<String, Value>, key: &str) -> Option<i64> {
    match attrs.get(key) {
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())),
        None => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_build_query_url_requests_json_with_encoded_where() {
        let params = QueryParams {
            where_clause: "CreationDate BETWEEN CURRENT_TIMESTAMP - 24 AND CURRENT_TIMESTAMP"
                .to_string(),
            return_geometry: false,
            ..QueryParams::default()
        };
        let url = build_query_url("https://host/gauges_2_view/FeatureServer/0/query", &params);
        assert!(url.contains("f=json"), "must request JSON format");
        assert!(
            url.contains("where=CreationDate%20BETWEEN"),
            "where clause must be URL-encoded, got: {}",
            url
        );
        assert!(url.contains("returnGeometry=false"));
        assert!(
            !url.contains("outSR"),
            "outSR only applies when geometry is requested"
        );
    }

    #[test]
    fn test_build_query_url_includes_geometry_spatial_reference() {
        let url = build_query_url("https://host/layer/FeatureServer/0/query", &QueryParams::default());
        assert!(url.contains("returnGeometry=true"));
        assert!(url.contains("outSR=4326"), "geometry requests must pin WGS84");
    }

    #[test]
    fn test_build_query_url_pagination_and_ordering() {
        let params = QueryParams {
            order_by: Some("CreationDate DESC".to_string()),
            record_count: Some(1000),
            offset: Some(2000),
            ..QueryParams::default()
        };
        let url = build_query_url("https://host/rivers/FeatureServer/0/query", &params);
        assert!(url.contains("orderByFields=CreationDate%20DESC"));
        assert!(url.contains("resultRecordCount=1000"));
        assert!(url.contains("resultOffset=2000"));
    }

    #[test]
    fn test_build_spatial_url_encodes_polygon_and_relation() {
        let rings = vec![vec![
            [79.8, 6.8],
            [80.2, 6.8],
            [80.2, 7.1],
            [79.8, 7.1],
            [79.8, 6.8],
        ]];
        let url = build_spatial_url(
            "https://host/rivers/FeatureServer/0/query",
            &rings,
            "FID",
            Some(0.001),
        );
        assert!(url.contains("spatialRel=esriSpatialRelIntersects"));
        assert!(url.contains("geometryType=esriGeometryPolygon"));
        assert!(
            url.contains("geometry=%7B%22rings%22"),
            "polygon payload must be URL-encoded JSON, got: {}",
            url
        );
        assert!(url.contains("maxAllowableOffset=0.001"));
    }

    #[test]
    fn test_build_spatial_url_omits_tolerance_when_unset() {
        let rings = vec![vec![[79.8, 6.8], [80.2, 6.8], [79.8, 7.1], [79.8, 6.8]]];
        let url = build_spatial_url("https://host/rivers/FeatureServer/0/query", &rings, "FID", None);
        assert!(!url.contains("maxAllowableOffset"));
    }

    // --- Response parsing ---------------------------------------------------

    #[test]
    fn test_parse_station_features_with_point_geometry() {
        let features = parse_query_response(fixture_hydrostations_json())
            .expect("valid fixture should parse");
        assert_eq!(features.len(), 5);

        let hanwella = &features[0];
        assert_eq!(
            attr_str(&hanwella.attributes, "station").as_deref(),
            Some("Hanwella")
        );
        let geom = hanwella.geometry.as_ref().expect("point geometry");
        assert!((geom.x.unwrap() - 80.0815).abs() < 1e-6);
        assert!((geom.y.unwrap() - 6.9094).abs() < 1e-6);
    }

    #[test]
    fn test_parse_polyline_features() {
        let features =
            parse_query_response(fixture_rivers_page_json()).expect("valid fixture should parse");
        assert_eq!(features.len(), 2);
        let first = features[0].geometry.as_ref().expect("polyline geometry");
        assert_eq!(first.paths.len(), 1);
        assert!(first.paths[0].len() >= 2, "a path has at least two vertices");
        assert!(first.rings.is_empty());
    }

    #[test]
    fn test_parse_polygon_features() {
        let features =
            parse_query_response(fixture_basins_json()).expect("valid fixture should parse");
        let kelani = &features[0];
        assert_eq!(
            attr_str(&kelani.attributes, "basin").as_deref(),
            Some("Kelani Ganga")
        );
        let geom = kelani.geometry.as_ref().expect("polygon geometry");
        assert_eq!(geom.rings.len(), 1);
        assert!(geom.paths.is_empty());
    }

    #[test]
    fn test_parse_missing_features_key_yields_empty_list() {
        // The service omits `features` on some empty results; that's data,
        // not an error.
        let features = parse_query_response(r#"{"objectIdFieldName": "FID"}"#)
            .expect("missing features key should parse as empty");
        assert!(features.is_empty());
    }

    #[test]
    fn test_parse_service_error_payload_is_a_request_error() {
        let result = parse_query_response(fixture_service_error_json());
        match result {
            Err(FeedError::Request(msg)) => {
                assert!(msg.contains("400"), "should carry the service code: {}", msg)
            }
            other => panic!("expected Request error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_json_is_a_parse_error() {
        let result = parse_query_response("{ not json }}");
        assert!(matches!(result, Err(FeedError::Parse(_))));
    }

    // --- Attribute helpers --------------------------------------------------

    #[test]
    fn test_attr_f64_accepts_numbers_and_numeric_strings() {
        let attrs: serde_json::Map<String, Value> = serde_json::from_str(
            r#"{"a": 7.5, "b": "8.25", "c": 10, "d": "n/a", "e": null}"#,
        )
        .unwrap();
        assert_eq!(attr_f64(&attrs, "a"), Some(7.5));
        assert_eq!(attr_f64(&attrs, "b"), Some(8.25));
        assert_eq!(attr_f64(&attrs, "c"), Some(10.0));
        assert_eq!(attr_f64(&attrs, "d"), None);
        assert_eq!(attr_f64(&attrs, "e"), None);
        assert_eq!(attr_f64(&attrs, "missing"), None);
    }

    #[test]
    fn test_attr_str_ignores_non_strings() {
        let attrs: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"name": "Hanwella", "level": 7.5}"#).unwrap();
        assert_eq!(attr_str(&attrs, "name").as_deref(), Some("Hanwella"));
        assert_eq!(attr_str(&attrs, "level"), None);
    }

    #[test]
    fn test_attr_i64_reads_epoch_milliseconds() {
        let attrs: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"CreationDate": 1764409145000}"#).unwrap();
        assert_eq!(attr_i64(&attrs, "CreationDate"), Some(1_764_409_145_000));
    }
}
