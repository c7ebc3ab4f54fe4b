/// Network-wide flood summary derivation.
///
/// Pure function over the aggregated station list: per-status counts, the
/// ordered list of actively flooding stations, and the set of affected
/// basins. Recomputed on every request.

use crate::model::{FloodSummary, FloodingStation, FloodStatus, Station};

/// Builds the summary from an aggregated station list.
///
/// Flooding list ordering: MAJOR_FLOOD entries strictly before MINOR_FLOOD
/// entries, and within each group descending by water level. A missing
/// level sorts as zero but is never surfaced as a real value.
pub fn build_summary(stations: &[Station]) -> FloodSummary {
    let count = |status: FloodStatus| stations.iter().filter(|s| s.status == status).count();

    let mut flooding: Vec<&Station> = stations.iter().filter(|s| s.status.is_flooding()).collect();
    flooding.sort_by(|a, b| {
        let group = |s: &Station| if s.status == FloodStatus::MajorFlood { 0 } else { 1 };
        group(a).cmp(&group(b)).then_with(|| {
            let level = |s: &Station| s.water_level_m.unwrap_or(0.0);
            level(b).total_cmp(&level(a))
        })
    });

    let flooding_stations: Vec<FloodingStation> = flooding
        .iter()
        .map(|s| FloodingStation {
            name: s.name.clone(),
            basin: s.basin.clone(),
            status: s.status,
            water_level_m: s.water_level_m,
        })
        .collect();

    let mut affected_basins = Vec::new();
    for station in &flooding_stations {
        if !station.basin.is_empty() && !affected_basins.contains(&station.basin) {
            affected_basins.push(station.basin.clone());
        }
    }

    FloodSummary {
        total_stations: stations.len(),
        major_flood: count(FloodStatus::MajorFlood),
        minor_flood: count(FloodStatus::MinorFlood),
        alert: count(FloodStatus::Alert),
        normal: count(FloodStatus::Normal),
        unknown: count(FloodStatus::Unknown),
        no_data: count(FloodStatus::NoData),
        flooding_stations,
        affected_basins,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
