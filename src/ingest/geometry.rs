/// River and basin geometry retrieval.
///
/// The rivers layer is large (thousands of polyline segments) and is always
/// fetched through the pagination loop; the basin layer is a handful of
/// polygons. The detailed flooded-rivers path combines both: basin polygons
/// select which rivers matter, then a polygon-intersects-line query pulls
/// just those segments.

use crate::ingest::arcgis::{
    self, FeedClient, Feature, QueryParams, LAYER_BASINS, LAYER_RIVERS,
};
use crate::ingest::gauges::FIELD_BASIN;
use crate::model::FeedError;

/// Page size for the rivers layer; the service caps transfers well above
/// this, and the short-page check terminates the loop.
pub const RIVER_PAGE_SIZE: usize = 1000;

/// Geometry generalization for spatial river queries, in degrees
/// (~100 m near the equator). Keeps detailed-mode payloads reasonable.
pub const GENERALIZE_TOLERANCE_DEG: f64 = 0.001;

// ---------------------------------------------------------------------------
// Rivers
// ---------------------------------------------------------------------------

/// Fetches every river polyline feature, paging until a short page.
pub fn fetch_river_features(feed: &FeedClient) -> Result<Vec<Feature>, FeedError> {
    let params = QueryParams {
        out_fields: "FID".to_string(),
        ..QueryParams::default()
    };
    feed.query_pages(LAYER_RIVERS, &params, RIVER_PAGE_SIZE)
}

/// Flattens polyline features into their vertex paths ([lon, lat] pairs).
/// Features without paths contribute nothing.
pub fn feature_paths(features: &[Feature]) -> Vec<Vec<[f64; 2]>> {
    features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(|g| g.paths.iter().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// Basins
// ---------------------------------------------------------------------------

/// A named basin polygon, in WGS84 rings.
#[derive(Debug, Clone, PartialEq)]
pub struct BasinPolygon {
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Fetches all basin polygons (paginated for symmetry with the rivers
/// layer, although the basin count is small).
pub fn fetch_basin_polygons(feed: &FeedClient) -> Result<Vec<BasinPolygon>, FeedError> {
    let features = feed.query_pages(LAYER_BASINS, &QueryParams::default(), RIVER_PAGE_SIZE)?;
    Ok(basin_polygons(&features))
}

/// Projects polygon features into named `BasinPolygon`s. Features lacking a
/// basin name or ring geometry are dropped — an unnamed polygon cannot be
/// joined to basin state.
pub fn basin_polygons(features: &[Feature]) -> Vec<BasinPolygon> {
    features
        .iter()
        .filter_map(|f| {
            let name = arcgis::attr_str(&f.attributes, FIELD_BASIN)?;
            let name = name.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let rings = f.geometry.as_ref()?.rings.clone();
            if rings.is_empty() {
                return None;
            }
            Some(BasinPolygon { name, rings })
        })
        .collect()
}

/// Runs the polygon-intersects-line query for one basin and returns the
/// intersecting river vertex paths.
pub fn fetch_rivers_in_basin(
    feed: &FeedClient,
    polygon: &BasinPolygon,
) -> Result<Vec<Vec<[f64; 2]>>, FeedError> {
    let features = feed.query_intersecting(
        LAYER_RIVERS,
        &polygon.rings,
        "FID",
        Some(GENERALIZE_TOLERANCE_DEG),
    )?;
    Ok(feature_paths(&features))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::arcgis::parse_query_response;
    use crate::ingest::fixtures::*;

    #[test]
    fn test_feature_paths_flattens_all_polylines() {
        let features = parse_query_response(fixture_rivers_page_json()).unwrap();
        let paths = feature_paths(&features);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 3);
        assert_eq!(paths[1].len(), 2);
        // Coordinates stay [lon, lat].
        assert!((paths[0][0][0] - 80.4183).abs() < 1e-6);
        assert!((paths[0][0][1] - 6.9893).abs() < 1e-6);
    }

    #[test]
    fn test_feature_paths_skips_features_without_geometry() {
        let features =
            parse_query_response(r#"{ "features": [ { "attributes": { "FID": 7 } } ] }"#).unwrap();
        assert!(feature_paths(&features).is_empty());
    }

    #[test]
    fn test_basin_polygons_project_name_and_rings() {
        let features = parse_query_response(fixture_basins_json()).unwrap();
        let basins = basin_polygons(&features);
        assert_eq!(basins.len(), 2);
        assert_eq!(basins[0].name, "Kelani Ganga");
        assert_eq!(basins[0].rings.len(), 1);
        assert_eq!(basins[0].rings[0].len(), 5, "closed ring repeats first vertex");
    }

    #[test]
    fn test_basin_polygons_drop_unnamed_or_ringless_features() {
        let json = r#"{
          "features": [
            { "attributes": { "basin": "" },
              "geometry": { "rings": [[[79.0, 6.0], [80.0, 6.0], [79.0, 7.0], [79.0, 6.0]]] } },
            { "attributes": { "basin": "Nilwala Ganga" } }
          ]
        }"#;
        let features = parse_query_response(json).unwrap();
        assert!(basin_polygons(&features).is_empty());
    }
}
