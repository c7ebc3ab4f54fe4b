/// Static reference data loader — parses the three name-keyed tables that
/// ship with the service:
///
///   - `locations.toml`    — named point locations for place-name risk queries
///   - `stations.toml`     — gauging station registry with static thresholds
///   - `river_lines.toml`  — simplified river lines, basin-tagged, connecting
///                           named stations
///
/// Loaded once at process start into an immutable `ReferenceData` and passed
/// by shared reference into the engines that need it; nothing mutates these
/// tables after load. Keeping them in TOML means threshold or geometry
/// updates don't require recompiling the service.

use std::fs;
use std::path::Path;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Table row types
// ---------------------------------------------------------------------------

/// A named point location (city or town).
#[derive(Debug, Clone, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Registry entry for a gauging station.
///
/// The static thresholds are the Irrigation Department's published danger
/// levels; the live feed carries its own copy per reading, which is what
/// classification uses. Some stations have no published thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceStation {
    pub name: String,
    pub basin: String,
    pub lat: f64,
    pub lon: f64,
    pub thresholds: Option<StaticThresholds>,
}

/// Published water-level danger thresholds, in meters, ascending.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StaticThresholds {
    pub alert_m: f64,
    pub minor_m: f64,
    pub major_m: f64,
}

/// A simplified river line: straight segments between the named stations it
/// connects, pre-authored so the map can draw flooded rivers without
/// touching the live geometry service.
#[derive(Debug, Clone, Deserialize)]
pub struct RiverLine {
    pub basin: String,
    pub stations: Vec<String>,
    /// Ordered [lon, lat] vertex pairs.
    pub points: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// TOML file roots
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LocationsFile {
    location: Vec<NamedLocation>,
}

#[derive(Debug, Deserialize)]
struct StationsFile {
    station: Vec<ReferenceStation>,
}

#[derive(Debug, Deserialize)]
struct RiverLinesFile {
    line: Vec<RiverLine>,
}

// ---------------------------------------------------------------------------
// ReferenceData
// ---------------------------------------------------------------------------

/// The three reference tables, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub locations: Vec<NamedLocation>,
    pub stations: Vec<ReferenceStation>,
    pub river_lines: Vec<RiverLine>,
}

impl ReferenceData {
    /// Loads the tables from the given directory.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = dir.as_ref();

        let locations: LocationsFile = read_toml(&dir.join("locations.toml"))?;
        let stations: StationsFile = read_toml(&dir.join("stations.toml"))?;
        let river_lines: RiverLinesFile = read_toml(&dir.join("river_lines.toml"))?;

        Ok(ReferenceData {
            locations: locations.location,
            stations: stations.station,
            river_lines: river_lines.line,
        })
    }

    /// Loads from the current working directory (project root when running
    /// via `cargo run`).
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from_dir(".")
    }

    /// Case-insensitive lookup of a named location.
    pub fn find_location(&self, name: &str) -> Option<&NamedLocation> {
        let wanted = name.trim();
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(wanted))
    }

    /// Looks up a station registry entry by name.
    pub fn find_station(&self, name: &str) -> Option<&ReferenceStation> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// All simplified river lines belonging to a basin.
    pub fn lines_for_basin(&self, basin: &str) -> Vec<&RiverLine> {
        self.river_lines
            .iter()
            .filter(|l| l.basin == basin)
            .collect()
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let parsed = toml::from_str(&contents)
        .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn load() -> ReferenceData {
        ReferenceData::load_default().expect("reference tables should load from project root")
    }

    #[test]
    fn test_tables_load_and_are_nonempty() {
        let data = load();
        assert!(data.locations.len() >= 8, "should ship a useful location set");
        assert!(data.stations.len() >= 12, "should cover the gauging network");
        assert!(!data.river_lines.is_empty());
    }

    #[test]
    fn test_no_duplicate_station_names() {
        let data = load();
        let mut seen = HashSet::new();
        for station in &data.stations {
            assert!(
                seen.insert(station.name.as_str()),
                "duplicate station name '{}' in stations.toml",
                station.name
            );
        }
    }

    #[test]
    fn test_station_coordinates_are_within_sri_lanka() {
        let data = load();
        for station in &data.stations {
            assert!(
                (5.5..10.0).contains(&station.lat) && (79.5..82.0).contains(&station.lon),
                "station '{}' has out-of-range coordinates ({}, {})",
                station.name,
                station.lat,
                station.lon
            );
        }
    }

    #[test]
    fn test_static_thresholds_ascend_where_defined() {
        // alert < minor < major — a violated order would misclassify every
        // reading at that station.
        let data = load();
        for station in &data.stations {
            if let Some(t) = &station.thresholds {
                assert!(
                    t.alert_m < t.minor_m && t.minor_m < t.major_m,
                    "thresholds out of order for '{}'",
                    station.name
                );
            }
        }
    }

    #[test]
    fn test_river_lines_reference_registered_stations_and_basins() {
        let data = load();
        let basins: HashSet<_> = data.stations.iter().map(|s| s.basin.as_str()).collect();
        for line in &data.river_lines {
            assert!(
                basins.contains(line.basin.as_str()),
                "river line references unknown basin '{}'",
                line.basin
            );
            assert!(
                line.points.len() >= 2,
                "a river line needs at least two vertices ({})",
                line.basin
            );
            for name in &line.stations {
                assert!(
                    data.find_station(name).is_some(),
                    "river line in '{}' references unknown station '{}'",
                    line.basin,
                    name
                );
            }
        }
    }

    #[test]
    fn test_find_location_is_case_insensitive() {
        let data = load();
        assert!(data.find_location("colombo").is_some());
        assert!(data.find_location("COLOMBO").is_some());
        assert!(data.find_location("Atlantis").is_none());
    }

    #[test]
    fn test_lines_for_basin_filters_exactly() {
        let data = load();
        for line in data.lines_for_basin("Kelani Ganga") {
            assert_eq!(line.basin, "Kelani Ganga");
        }
    }
}
