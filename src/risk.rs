/// Proximity-based flood risk assessment for an arbitrary point.
///
/// Finds the monitored stations within a search radius, picks the worst
/// status among them, and synthesizes a verdict with human-readable
/// summary and advisory text. The core (`assess`) is a pure function over
/// a station list; `check_risk` is the fetching wrapper.

use crate::aggregate;
use crate::geo;
use crate::ingest::arcgis::FeedClient;
use crate::model::{
    FeedError, FloodStatus, NearbyStation, RiskAssessment, RiskLevel, Station,
};
use crate::severity;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 15.0;

/// Maximum number of nearby stations reported, closest first.
const NEARBY_LIMIT: usize = 5;

/// Fetches the live station list and assesses risk at the given point.
/// Upstream failure propagates — the caller must not read it as low risk.
pub fn check_risk(
    feed: &FeedClient,
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> Result<RiskAssessment, FeedError> {
    let stations = aggregate::collect_stations(feed)?;
    Ok(assess(&stations, lat, lon, radius_km))
}

/// Assesses flood risk at a point from an already-aggregated station list.
///
/// Stations with known coordinates and distance <= radius (inclusive
/// boundary) are kept, sorted ascending by distance. The worst status is
/// found by scanning in distance order — ties on severity keep the closer,
/// first-seen station — short-circuiting on MAJOR_FLOOD since nothing can
/// outrank it.
pub fn assess(stations: &[Station], lat: f64, lon: f64, radius_km: f64) -> RiskAssessment {
    let mut nearby: Vec<NearbyStation> = stations
        .iter()
        .filter_map(|station| {
            let (s_lat, s_lon) = (station.lat?, station.lon?);
            let distance = geo::distance_km(lat, lon, s_lat, s_lon);
            if distance <= radius_km {
                Some(NearbyStation {
                    station: station.clone(),
                    distance_km: round_tenth(distance),
                })
            } else {
                None
            }
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut worst: Option<&NearbyStation> = None;
    for candidate in &nearby {
        match worst {
            Some(current) if candidate.station.status >= current.station.status => {}
            _ => worst = Some(candidate),
        }
        if candidate.station.status == FloodStatus::MajorFlood {
            break;
        }
    }

    let risk_level = match worst {
        Some(w) => severity::risk_level(w.station.status),
        None => RiskLevel::Unknown,
    };

    let (summary, advice) = describe(worst, risk_level);

    nearby.truncate(NEARBY_LIMIT);

    RiskAssessment {
        lat,
        lon,
        radius_km,
        risk_level,
        summary,
        nearby,
        advice,
    }
}

/// Builds the summary and advisory strings for a verdict.
fn describe(worst: Option<&NearbyStation>, risk_level: RiskLevel) -> (String, String) {
    match (worst, risk_level) {
        (Some(w), RiskLevel::High | RiskLevel::Medium) => {
            let summary = format!(
                "{} at {} ({} km away)",
                w.station.status, w.station.name, w.distance_km
            );
            let advice = if risk_level == RiskLevel::High {
                let basin = if w.station.basin.is_empty() {
                    "the river"
                } else {
                    w.station.basin.as_str()
                };
                format!(
                    "Active flooding detected nearby. If you are near {}, \
                     move to higher ground and follow official alerts.",
                    basin
                )
            } else {
                format!(
                    "Elevated water levels at {}. Monitor the situation.",
                    w.station.name
                )
            };
            (summary, advice)
        }
        (Some(_), RiskLevel::Low) => (
            "No flood alerts within search radius".to_string(),
            "No immediate flood risk detected from monitored rivers. \
             Stay aware of local conditions."
                .to_string(),
        ),
        _ => (
            "No water-level data within search radius".to_string(),
            "Flood risk could not be determined from monitored rivers. \
             Follow official alerts for this area."
                .to_string(),
        ),
    }
}

fn round_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
