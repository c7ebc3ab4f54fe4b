/// Hydrostation metadata and live gauge readings.
///
/// Two layers feed the station aggregator:
///   - `hydrostations` — one point feature per station (join key `station`)
///   - `gauges_2_view` — rolling gauge observations (join key `gauge`),
///     returned newest-first within a 24-hour lookback window
///
/// Everything here projects the loosely-typed feature attributes into the
/// typed `StationRecord` / `StationReading` domain records; nothing past
/// this module touches a raw attribute map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::ingest::arcgis::{
    self, FeedClient, Feature, QueryParams, LAYER_GAUGES, LAYER_STATIONS,
};
use crate::model::{FeedError, StationReading, ThresholdSet};

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

// hydrostations layer
pub const FIELD_STATION: &str = "station";
pub const FIELD_BASIN: &str = "basin";

// gauges_2_view layer
pub const FIELD_GAUGE: &str = "gauge";
pub const FIELD_WATER_LEVEL: &str = "water_level";
pub const FIELD_ALERT: &str = "alertpull";
pub const FIELD_MINOR: &str = "minorpull";
pub const FIELD_MAJOR: &str = "majorpull";
pub const FIELD_TIME: &str = "CreationDate";

/// Lookback window for the latest-reading query. The feed's timestamp
/// arithmetic is in hours.
const GAUGE_LOOKBACK_WHERE: &str =
    "CreationDate BETWEEN CURRENT_TIMESTAMP - 24 AND CURRENT_TIMESTAMP";

/// Upper bound on gauge rows per fetch; comfortably above one day of
/// observations across the whole network.
const GAUGE_FETCH_LIMIT: usize = 8000;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// A hydrostation record that passed the data-quality filter: it has a
/// non-empty name and point coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub name: String,
    /// Owning basin, trimmed; empty when the feed omits it.
    pub basin: String,
    pub lat: f64,
    pub lon: f64,
}

/// Fetches all hydrostation records with coordinates.
pub fn fetch_station_records(feed: &FeedClient) -> Result<Vec<StationRecord>, FeedError> {
    let features = feed.query(LAYER_STATIONS, &QueryParams::default())?;
    Ok(station_records(&features))
}

/// Projects hydrostation features into `StationRecord`s, preserving feed
/// order. Records lacking a name or point geometry are dropped silently —
/// they cannot participate in joins or spatial operations.
pub fn station_records(features: &[Feature]) -> Vec<StationRecord> {
    features
        .iter()
        .filter_map(|f| {
            let name = arcgis::attr_str(&f.attributes, FIELD_STATION)?;
            let name = name.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let geom = f.geometry.as_ref()?;
            let (lon, lat) = (geom.x?, geom.y?);
            let basin = arcgis::attr_str(&f.attributes, FIELD_BASIN)
                .map(|b| b.trim().to_string())
                .unwrap_or_default();
            Some(StationRecord { name, basin, lat, lon })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Gauge readings
// ---------------------------------------------------------------------------

/// Fetches the latest reading per gauge within the lookback window.
pub fn fetch_latest_readings(
    feed: &FeedClient,
) -> Result<HashMap<String, StationReading>, FeedError> {
    let params = QueryParams {
        where_clause: GAUGE_LOOKBACK_WHERE.to_string(),
        return_geometry: false,
        order_by: Some(format!("{} DESC", FIELD_TIME)),
        record_count: Some(GAUGE_FETCH_LIMIT),
        ..QueryParams::default()
    };
    let features = feed.query(LAYER_GAUGES, &params)?;
    Ok(latest_readings(&features))
}

/// Deduplicates a newest-first observation list down to one reading per
/// gauge: the first occurrence of each key wins.
pub fn latest_readings(features: &[Feature]) -> HashMap<String, StationReading> {
    let mut latest: HashMap<String, StationReading> = HashMap::new();
    for feature in features {
        if let Some(reading) = parse_reading(feature) {
            latest.entry(reading.station.clone()).or_insert(reading);
        }
    }
    latest
}

/// Projects one gauge feature into a `StationReading`. Returns `None` when
/// the join key is absent or empty; measurement fields stay individually
/// optional.
pub fn parse_reading(feature: &Feature) -> Option<StationReading> {
    let attrs = &feature.attributes;
    let station = arcgis::attr_str(attrs, FIELD_GAUGE)?;
    let station = station.trim().to_string();
    if station.is_empty() {
        return None;
    }

    Some(StationReading {
        station,
        water_level_m: arcgis::attr_f64(attrs, FIELD_WATER_LEVEL),
        thresholds: ThresholdSet {
            alert_m: arcgis::attr_f64(attrs, FIELD_ALERT),
            minor_m: arcgis::attr_f64(attrs, FIELD_MINOR),
            major_m: arcgis::attr_f64(attrs, FIELD_MAJOR),
        },
        observed: arcgis::attr_i64(attrs, FIELD_TIME)
            .and_then(DateTime::<Utc>::from_timestamp_millis),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
