/// Test fixtures: representative JSON payloads from the Irrigation
/// Department feature layers.
///
/// Structurally complete but truncated to the minimum needed to exercise
/// the parsers and the join logic. They reflect the real envelope returned
/// by `{layer}/FeatureServer/0/query?f=json`.
///
/// Feature-service response shape:
///   response.features[]
///     .attributes          — flat map, keys may be absent or null
///     .geometry.x / .y     — point layers (hydrostations)
///     .geometry.paths[][]  — polyline layers (rivers), [lon, lat] pairs
///     .geometry.rings[][]  — polygon layers (river_basins)
///
/// Note: the gauge feed sometimes encodes numbers as strings and orders
/// rows newest-first; fixtures mirror both so dedup and projection are
/// tested against realistic data.

/// Five hydrostation records: three valid (Hanwella, Ratnapura, Thawalama),
/// one with an empty station name, one with no geometry. The last two must
/// be silently dropped by the station filter.
#[cfg(test)]
pub(crate) fn fixture_hydrostations_json() -> &'static str {
    r#"{
      "features": [
        {
          "attributes": { "OBJECTID": 1, "station": "Hanwella", "basin": "Kelani Ganga" },
          "geometry": { "x": 80.0815, "y": 6.9094 }
        },
        {
          "attributes": { "OBJECTID": 2, "station": "Ratnapura", "basin": "Kalu Ganga " },
          "geometry": { "x": 80.3992, "y": 6.6828 }
        },
        {
          "attributes": { "OBJECTID": 3, "station": "Thawalama", "basin": "Gin Ganga" },
          "geometry": { "x": 80.3333, "y": 6.3358 }
        },
        {
          "attributes": { "OBJECTID": 4, "station": "", "basin": "Kelani Ganga" },
          "geometry": { "x": 79.9500, "y": 6.9500 }
        },
        {
          "attributes": { "OBJECTID": 5, "station": "Orphan Gauge", "basin": "Mahaweli Ganga" }
        }
      ]
    }"#
}

/// Gauge readings ordered newest-first, as the live feed returns them.
/// Hanwella appears twice — dedup must keep the 10.81 m row. Thawalama is
/// missing its minor threshold, so it classifies as UNKNOWN despite having
/// a reading. Ratnapura's water level arrives string-encoded.
#[cfg(test)]
pub(crate) fn fixture_gauges_json() -> &'static str {
    r#"{
      "features": [
        {
          "attributes": {
            "gauge": "Hanwella",
            "water_level": 10.81,
            "alertpull": 7.5,
            "minorpull": 9.0,
            "majorpull": 10.0,
            "CreationDate": 1764409145000
          }
        },
        {
          "attributes": {
            "gauge": "Ratnapura",
            "water_level": "6.80",
            "alertpull": 6.5,
            "minorpull": 7.5,
            "majorpull": 8.5,
            "CreationDate": 1764408600000
          }
        },
        {
          "attributes": {
            "gauge": "Hanwella",
            "water_level": 9.50,
            "alertpull": 7.5,
            "minorpull": 9.0,
            "majorpull": 10.0,
            "CreationDate": 1764405545000
          }
        },
        {
          "attributes": {
            "gauge": "Thawalama",
            "water_level": 3.20,
            "alertpull": 4.0,
            "minorpull": null,
            "majorpull": 6.0,
            "CreationDate": 1764404000000
          }
        }
      ]
    }"#
}

/// One rivers-layer page with two polyline features.
#[cfg(test)]
pub(crate) fn fixture_rivers_page_json() -> &'static str {
    r#"{
      "features": [
        {
          "attributes": { "FID": 101 },
          "geometry": {
            "paths": [
              [[80.4183, 6.9893], [80.1706, 6.9736], [80.0815, 6.9094]]
            ]
          }
        },
        {
          "attributes": { "FID": 102 },
          "geometry": {
            "paths": [
              [[80.0815, 6.9094], [79.8740, 6.9610]]
            ]
          }
        }
      ]
    }"#
}

/// Two basin polygons (Kelani Ganga, Kalu Ganga), single-ring each.
#[cfg(test)]
pub(crate) fn fixture_basins_json() -> &'static str {
    r#"{
      "features": [
        {
          "attributes": { "OBJECTID": 1, "basin": "Kelani Ganga" },
          "geometry": {
            "rings": [
              [[79.85, 6.85], [80.50, 6.85], [80.50, 7.10], [79.85, 7.10], [79.85, 6.85]]
            ]
          }
        },
        {
          "attributes": { "OBJECTID": 2, "basin": "Kalu Ganga" },
          "geometry": {
            "rings": [
              [[79.95, 6.40], [80.55, 6.40], [80.55, 6.75], [79.95, 6.75], [79.95, 6.40]]
            ]
          }
        }
      ]
    }"#
}

/// Service-level error payload delivered with HTTP 200 — must be surfaced
/// as a failure, not an empty success.
#[cfg(test)]
pub(crate) fn fixture_service_error_json() -> &'static str {
    r#"{
      "error": {
        "code": 400,
        "message": "Invalid query parameters",
        "details": ["'where' clause could not be parsed"]
      }
    }"#
}
