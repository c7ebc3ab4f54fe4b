/// Basin-river join engine: river geometry tagged with flood state.
///
/// Two fidelity modes trade precision against fetch cost:
///
///   - *simplified* — filters the pre-authored reference lines to flooded
///     basins. No upstream geometry fetch; bounded cost; available even
///     when the live geometry service is down.
///   - *detailed* — fetches basin polygons, then runs a
///     polygon-intersects-line query against the rivers layer for each
///     flooded basin, in parallel. Higher latency, real channel geometry.
///
/// Unlike the station aggregator, the detailed path tolerates partial
/// upstream failure: a failed per-basin query logs and contributes an
/// empty set for that basin only. Rivers are map decoration; station
/// status is the signal of record.

use std::sync::mpsc;

use serde::Serialize;
use threadpool::ThreadPool;

use crate::aggregate;
use crate::basins;
use crate::ingest::arcgis::FeedClient;
use crate::ingest::geometry::{self, BasinPolygon};
use crate::model::{FeedError, FloodStatus, Station};
use crate::reference::ReferenceData;

/// Worker cap for the per-basin spatial queries.
const BASIN_QUERY_WORKERS: usize = 4;

// ---------------------------------------------------------------------------
// Output types (GeoJSON-shaped)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<RiverFeature>,
}

impl RiverCollection {
    fn new(features: Vec<RiverFeature>) -> Self {
        RiverCollection {
            kind: "FeatureCollection",
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: RiverProperties,
    pub geometry: LineGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverProperties {
    pub basin: String,
    pub status: FloodStatus,
    /// Station names the line connects; present only on simplified lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stations: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Ordered [lon, lat] vertex pairs.
    pub coordinates: Vec<[f64; 2]>,
}

/// Flat from/to descriptor for non-map consumers (detailed mode only).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverSegment {
    pub basin: String,
    pub status: FloodStatus,
    pub from: [f64; 2],
    pub to: [f64; 2],
}

/// The join engine's full output: a line-feature collection plus the
/// parallel segment descriptors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodedRivers {
    pub geojson: RiverCollection,
    pub segments: Vec<RiverSegment>,
}

impl FloodedRivers {
    fn empty() -> Self {
        FloodedRivers {
            geojson: RiverCollection::new(Vec::new()),
            segments: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Fetches live station state and joins it to river geometry in the
/// requested fidelity mode.
pub fn flooded_rivers(
    feed: &FeedClient,
    reference: &ReferenceData,
    simplified: bool,
) -> Result<FloodedRivers, FeedError> {
    let stations = aggregate::collect_stations(feed)?;
    if simplified {
        Ok(simplified_rivers(&stations, reference))
    } else {
        detailed_rivers(feed, &stations)
    }
}

/// Simplified mode: static-table filter, no upstream geometry fetch.
pub fn simplified_rivers(stations: &[Station], reference: &ReferenceData) -> FloodedRivers {
    let flooded = basins::flooded_basins(stations);

    let features = reference
        .river_lines
        .iter()
        .filter_map(|line| {
            let status = *flooded.get(&line.basin)?;
            Some(RiverFeature {
                kind: "Feature",
                properties: RiverProperties {
                    basin: line.basin.clone(),
                    status,
                    stations: Some(line.stations.clone()),
                },
                geometry: LineGeometry {
                    kind: "LineString",
                    coordinates: line.points.clone(),
                },
            })
        })
        .collect();

    FloodedRivers {
        geojson: RiverCollection::new(features),
        segments: Vec::new(),
    }
}

/// Detailed mode: basin polygons select the flooded catchments, then one
/// spatial intersection query per basin runs on the pool. Query results
/// are merged in basin input order; order across basins carries no meaning.
pub fn detailed_rivers(feed: &FeedClient, stations: &[Station]) -> Result<FloodedRivers, FeedError> {
    let flooded = basins::flooded_basins(stations);
    if flooded.is_empty() {
        return Ok(FloodedRivers::empty());
    }

    let polygons = geometry::fetch_basin_polygons(feed)?;
    let targets: Vec<(BasinPolygon, FloodStatus)> = polygons
        .into_iter()
        .filter_map(|polygon| flooded.get(&polygon.name).map(|status| (polygon, *status)))
        .collect();
    if targets.is_empty() {
        return Ok(FloodedRivers::empty());
    }

    let pool = ThreadPool::new(targets.len().min(BASIN_QUERY_WORKERS));
    let (tx, rx) = mpsc::channel();
    for (index, (polygon, _)) in targets.iter().enumerate() {
        let feed = feed.clone();
        let polygon = polygon.clone();
        let tx = tx.clone();
        pool.execute(move || {
            let _ = tx.send((index, geometry::fetch_rivers_in_basin(&feed, &polygon)));
        });
    }
    drop(tx);

    let mut slots: Vec<Vec<Vec<[f64; 2]>>> = vec![Vec::new(); targets.len()];
    for (index, result) in rx {
        match result {
            Ok(paths) => slots[index] = paths,
            Err(e) => {
                // Partial degradation: this basin just draws no rivers.
                eprintln!(
                    "   ✗ river query failed for basin '{}': {}",
                    targets[index].0.name, e
                );
            }
        }
    }
    pool.join();

    let mut features = Vec::new();
    let mut segments = Vec::new();
    for ((polygon, status), paths) in targets.iter().zip(slots) {
        let (mut f, mut s) = paths_to_features(&polygon.name, *status, paths);
        features.append(&mut f);
        segments.append(&mut s);
    }

    Ok(FloodedRivers {
        geojson: RiverCollection::new(features),
        segments,
    })
}

/// Tags a basin's river paths with its status and derives the from/to
/// segment descriptors.
pub fn paths_to_features(
    basin: &str,
    status: FloodStatus,
    paths: Vec<Vec<[f64; 2]>>,
) -> (Vec<RiverFeature>, Vec<RiverSegment>) {
    let mut features = Vec::new();
    let mut segments = Vec::new();

    for path in paths {
        let (Some(first), Some(last)) = (path.first().copied(), path.last().copied()) else {
            continue;
        };
        segments.push(RiverSegment {
            basin: basin.to_string(),
            status,
            from: first,
            to: last,
        });
        features.push(RiverFeature {
            kind: "Feature",
            properties: RiverProperties {
                basin: basin.to_string(),
                status,
                stations: None,
            },
            geometry: LineGeometry {
                kind: "LineString",
                coordinates: path,
            },
        });
    }

    (features, segments)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::RiverLine;

    fn station(name: &str, basin: &str, status: FloodStatus) -> Station {
        Station {
            name: name.to_string(),
            basin: basin.to_string(),
            lat: Some(6.9),
            lon: Some(80.0),
            status,
            water_level_m: Some(5.0),
            thresholds: None,
            updated: None,
        }
    }

    fn test_reference() -> ReferenceData {
        ReferenceData {
            locations: Vec::new(),
            stations: Vec::new(),
            river_lines: vec![
                RiverLine {
                    basin: "Kelani Ganga".to_string(),
                    stations: vec!["Glencourse".to_string(), "Hanwella".to_string()],
                    points: vec![[80.1706, 6.9736], [80.0815, 6.9094]],
                },
                RiverLine {
                    basin: "Kalu Ganga".to_string(),
                    stations: vec!["Ratnapura".to_string(), "Ellagawa".to_string()],
                    points: vec![[80.3992, 6.6828], [80.2150, 6.6580]],
                },
            ],
        }
    }

    #[test]
    fn test_simplified_returns_nothing_when_no_basin_floods() {
        let stations = vec![
            station("A", "Kelani Ganga", FloodStatus::Alert),
            station("B", "Kalu Ganga", FloodStatus::Normal),
        ];
        let result = simplified_rivers(&stations, &test_reference());
        assert!(result.geojson.features.is_empty());
        assert!(result.segments.is_empty());
    }

    #[test]
    fn test_simplified_filters_lines_to_flooded_basins() {
        let stations = vec![
            station("A", "Kelani Ganga", FloodStatus::MinorFlood),
            station("B", "Kalu Ganga", FloodStatus::Normal),
        ];
        let result = simplified_rivers(&stations, &test_reference());
        assert_eq!(result.geojson.features.len(), 1);
        let feature = &result.geojson.features[0];
        assert_eq!(feature.properties.basin, "Kelani Ganga");
        assert_eq!(feature.properties.status, FloodStatus::MinorFlood);
        assert_eq!(
            feature.properties.stations.as_deref(),
            Some(&["Glencourse".to_string(), "Hanwella".to_string()][..])
        );
    }

    #[test]
    fn test_simplified_line_carries_basin_worst_status() {
        // Basin worst is MAJOR even though another member is only minor.
        let stations = vec![
            station("A", "Kalu Ganga", FloodStatus::MinorFlood),
            station("B", "Kalu Ganga", FloodStatus::MajorFlood),
        ];
        let result = simplified_rivers(&stations, &test_reference());
        assert_eq!(result.geojson.features.len(), 1);
        assert_eq!(
            result.geojson.features[0].properties.status,
            FloodStatus::MajorFlood
        );
    }

    #[test]
    fn test_paths_to_features_tags_every_path_and_derives_segments() {
        let paths = vec![
            vec![[80.41, 6.98], [80.17, 6.97], [80.08, 6.90]],
            vec![[80.08, 6.90], [79.87, 6.96]],
        ];
        let (features, segments) =
            paths_to_features("Kelani Ganga", FloodStatus::MajorFlood, paths);
        assert_eq!(features.len(), 2);
        assert_eq!(segments.len(), 2);
        assert!(features.iter().all(|f| f.properties.status == FloodStatus::MajorFlood));
        assert_eq!(segments[0].from, [80.41, 6.98]);
        assert_eq!(segments[0].to, [80.08, 6.90]);
        assert_eq!(segments[1].from, [80.08, 6.90]);
        assert_eq!(segments[1].to, [79.87, 6.96]);
    }

    #[test]
    fn test_paths_to_features_skips_empty_paths() {
        let (features, segments) =
            paths_to_features("Gin Ganga", FloodStatus::MinorFlood, vec![vec![]]);
        assert!(features.is_empty());
        assert!(segments.is_empty());
    }

    #[test]
    fn test_geojson_serialization_shape() {
        let stations = vec![station("A", "Kelani Ganga", FloodStatus::MajorFlood)];
        let result = simplified_rivers(&stations, &test_reference());
        let json = serde_json::to_value(&result.geojson).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(json["features"][0]["properties"]["status"], "MAJOR_FLOOD");
        assert_eq!(
            json["features"][0]["geometry"]["coordinates"][0][0],
            80.1706
        );
    }
}
