/// lkflood_service: Sri Lanka island-wide flood risk monitoring service.
///
/// # Module structure
///
/// ```text
/// lkflood_service
/// ├── model       — shared data types (Station, FloodStatus, FeedError, …)
/// ├── severity    — water-level classification against threshold bands
/// ├── geo         — great-circle distance math
/// ├── reference   — static lookup tables (locations.toml, stations.toml,
/// │                 river_lines.toml), loaded once at startup
/// ├── ingest
/// │   ├── arcgis    — feature-service query protocol: URLs, paging,
/// │   │               spatial joins, JSON parsing
/// │   ├── gauges    — hydrostation metadata + latest gauge readings
/// │   ├── geometry  — river polylines and basin polygons
/// │   └── fixtures (test only) — representative feed payloads
/// ├── aggregate   — station aggregator: parallel fetch + classify join
/// ├── summary     — counts, flooding list, affected basins
/// ├── basins      — per-basin grouping and worst-case status
/// ├── risk        — proximity risk assessment for a point
/// ├── rivers      — basin-river join engine (simplified / detailed)
/// └── endpoint    — HTTP surface for the presentation layer
/// ```

/// Public modules
pub mod aggregate;
pub mod basins;
pub mod endpoint;
pub mod geo;
pub mod ingest;
pub mod model;
pub mod reference;
pub mod risk;
pub mod rivers;
pub mod severity;
pub mod summary;
