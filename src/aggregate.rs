/// Station aggregator — the single source of truth for station state.
///
/// Joins hydrostation metadata with the latest gauge readings into the
/// canonical `Station` list everything downstream (summary, risk, river
/// join) consumes. The two upstream fetches are independent, so they run in
/// parallel on the collection pool; assembly starts only after both are in.
///
/// All-or-nothing: if either fetch fails the whole call fails. A partial
/// list would make water-level-less stations indistinguishable from
/// genuinely absent data, and the presentation layer must be able to tell
/// "no flooding" from "data unavailable".

use std::collections::HashMap;
use std::sync::mpsc;

use threadpool::ThreadPool;

use crate::ingest::arcgis::FeedClient;
use crate::ingest::gauges::{self, StationRecord};
use crate::model::{FeedError, FloodStatus, Station, StationReading};
use crate::severity;

/// One message from the parallel collection pool.
enum Fetched {
    Metadata(Result<Vec<StationRecord>, FeedError>),
    Readings(Result<HashMap<String, StationReading>, FeedError>),
}

/// Fetches metadata and readings concurrently, then assembles the station
/// list. Result order follows the upstream metadata order.
pub fn collect_stations(feed: &FeedClient) -> Result<Vec<Station>, FeedError> {
    let pool = ThreadPool::new(2);
    let (tx, rx) = mpsc::channel();

    {
        let feed = feed.clone();
        let tx = tx.clone();
        pool.execute(move || {
            let _ = tx.send(Fetched::Metadata(gauges::fetch_station_records(&feed)));
        });
    }
    {
        let feed = feed.clone();
        let tx = tx.clone();
        pool.execute(move || {
            let _ = tx.send(Fetched::Readings(gauges::fetch_latest_readings(&feed)));
        });
    }
    drop(tx);

    let mut metadata = None;
    let mut readings = None;
    for message in rx {
        match message {
            Fetched::Metadata(result) => metadata = Some(result),
            Fetched::Readings(result) => readings = Some(result),
        }
    }
    pool.join();

    // A worker panic would leave a slot unfilled; surface it as a request
    // failure rather than unwrapping.
    let metadata = metadata
        .ok_or_else(|| FeedError::Request("station metadata fetch did not complete".to_string()))??;
    let readings = readings
        .ok_or_else(|| FeedError::Request("gauge reading fetch did not complete".to_string()))??;

    Ok(assemble_stations(metadata, &readings))
}

/// Pure join step: builds one `Station` per metadata record, classified
/// against its latest reading.
///
/// Stations without a reading get `NO_DATA` and no level/thresholds. When a
/// reading exists its thresholds are carried onto the station even if
/// classification came back `UNKNOWN` from a partial set — the map shows
/// whatever the feed published.
pub fn assemble_stations(
    records: Vec<StationRecord>,
    readings: &HashMap<String, StationReading>,
) -> Vec<Station> {
    records
        .into_iter()
        .map(|record| match readings.get(&record.name) {
            Some(reading) => Station {
                name: record.name,
                basin: record.basin,
                lat: Some(record.lat),
                lon: Some(record.lon),
                status: severity::classify_with(reading.water_level_m, &reading.thresholds),
                water_level_m: reading.water_level_m,
                thresholds: Some(reading.thresholds),
                updated: reading.observed,
            },
            None => Station {
                name: record.name,
                basin: record.basin,
                lat: Some(record.lat),
                lon: Some(record.lon),
                status: FloodStatus::NoData,
                water_level_m: None,
                thresholds: None,
                updated: None,
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
