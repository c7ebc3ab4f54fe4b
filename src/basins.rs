/// Per-basin grouping and worst-case status aggregation.
///
/// A basin's status is the worst status among its member stations — never
/// an average — so a single major-flood gauge marks the whole basin. Ties
/// on equal severity keep the first-seen station; that order follows the
/// upstream response and is not guaranteed stable across runs.

use std::collections::HashMap;

use crate::model::{BasinState, FloodStatus, FloodingStation, Station};

/// Groups stations by non-empty basin name and derives each basin's state.
///
/// Result order follows the first appearance of each basin in the station
/// list. Stations without a basin name are left out — they cannot be
/// joined to river geometry.
pub fn basin_states(stations: &[Station]) -> Vec<BasinState> {
    let mut order: Vec<String> = Vec::new();
    let mut by_basin: HashMap<String, BasinState> = HashMap::new();

    for station in stations {
        if station.basin.is_empty() {
            continue;
        }
        let state = by_basin
            .entry(station.basin.clone())
            .or_insert_with(|| {
                order.push(station.basin.clone());
                BasinState {
                    basin: station.basin.clone(),
                    status: station.status,
                    flooding: Vec::new(),
                }
            });
        if station.status < state.status {
            state.status = station.status;
        }
        if station.status.is_flooding() {
            state.flooding.push(FloodingStation {
                name: station.name.clone(),
                basin: station.basin.clone(),
                status: station.status,
                water_level_m: station.water_level_m,
            });
        }
    }

    order
        .into_iter()
        .filter_map(|basin| by_basin.remove(&basin))
        .collect()
}

/// Map of currently flooded basins to their worst status.
pub fn flooded_basins(stations: &[Station]) -> HashMap<String, FloodStatus> {
    basin_states(stations)
        .into_iter()
        .filter(|state| state.is_flooded())
        .map(|state| (state.basin, state.status))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FloodStatus;

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

    #[test]
    fn test_basin_worst_status_is_most_severe_member() {
        let stations = vec![
            station("A", "Kelani Ganga", FloodStatus::MajorFlood),
            station("B", "Kelani Ganga", FloodStatus::MinorFlood),
            station("C", "Kelani Ganga", FloodStatus::Normal),
        ];
        let states = basin_states(&stations);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].status, FloodStatus::MajorFlood);
        assert!(states[0].is_flooded());
        assert_eq!(states[0].flooding.len(), 2, "normal station is not listed");
    }

    #[test]
    fn test_alert_basin_is_not_flooded() {
        let stations = vec![
            station("A", "Kalu Ganga", FloodStatus::Alert),
            station("B", "Kalu Ganga", FloodStatus::Normal),
        ];
        let states = basin_states(&stations);
        assert_eq!(states[0].status, FloodStatus::Alert);
        assert!(!states[0].is_flooded());
        assert!(states[0].flooding.is_empty());
    }

    #[test]
    fn test_empty_basin_names_are_excluded() {
        let stations = vec![
            station("A", "", FloodStatus::MajorFlood),
            station("B", "Gin Ganga", FloodStatus::Normal),
        ];
        let states = basin_states(&stations);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].basin, "Gin Ganga");
    }

    #[test]
    fn test_basin_order_follows_first_appearance() {
        let stations = vec![
            station("A", "Nilwala Ganga", FloodStatus::Normal),
            station("B", "Kelani Ganga", FloodStatus::Alert),
            station("C", "Nilwala Ganga", FloodStatus::MinorFlood),
        ];
        let states = basin_states(&stations);
        let basins: Vec<_> = states.iter().map(|s| s.basin.as_str()).collect();
        assert_eq!(basins, ["Nilwala Ganga", "Kelani Ganga"]);
        assert_eq!(states[0].status, FloodStatus::MinorFlood);
    }

    #[test]
    fn test_no_data_only_basin_keeps_no_data_status() {
        let stations = vec![station("A", "Mahaweli Ganga", FloodStatus::NoData)];
        let states = basin_states(&stations);
        assert_eq!(states[0].status, FloodStatus::NoData);
        assert!(!states[0].is_flooded());
    }

    #[test]
    fn test_flooded_basins_map_filters_to_active_floods() {
        let stations = vec![
            station("A", "Kelani Ganga", FloodStatus::MajorFlood),
            station("B", "Kalu Ganga", FloodStatus::Alert),
            station("C", "Gin Ganga", FloodStatus::MinorFlood),
        ];
        let flooded = flooded_basins(&stations);
        assert_eq!(flooded.len(), 2);
        assert_eq!(flooded.get("Kelani Ganga"), Some(&FloodStatus::MajorFlood));
        assert_eq!(flooded.get("Gin Ganga"), Some(&FloodStatus::MinorFlood));
        assert!(!flooded.contains_key("Kalu Ganga"));
    }
}
