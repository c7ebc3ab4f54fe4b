/// Core data types for the Sri Lanka flood monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external service knowledge — only types. The
/// loosely-typed ArcGIS attribute maps are projected into these records at
/// the ingest boundary and never leak past it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Flood status
// ---------------------------------------------------------------------------

/// Per-station flood status, declared in descending order of severity.
///
/// The derived `Ord` follows declaration order, so the *minimum* of a group
/// is its worst status. All "worst status" aggregations (basin state, risk
/// scan) rely on this; ties keep the first-seen entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FloodStatus {
    MajorFlood,
    MinorFlood,
    Alert,
    Normal,
    Unknown,
    NoData,
}

impl FloodStatus {
    /// True for the two statuses that count as active flooding.
    pub fn is_flooding(self) -> bool {
        matches!(self, FloodStatus::MajorFlood | FloodStatus::MinorFlood)
    }

    /// Wire name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            FloodStatus::MajorFlood => "MAJOR_FLOOD",
            FloodStatus::MinorFlood => "MINOR_FLOOD",
            FloodStatus::Alert => "ALERT",
            FloodStatus::Normal => "NORMAL",
            FloodStatus::Unknown => "UNKNOWN",
            FloodStatus::NoData => "NO_DATA",
        }
    }
}

impl std::fmt::Display for FloodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location risk verdict derived from the worst nearby station status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Water-level thresholds carried on a gauge reading, in meters.
///
/// Each level is independently optional — the upstream feed sometimes
/// publishes a reading with a partial threshold set. A station whose
/// reading is missing any threshold classifies as UNKNOWN rather than
/// being force-fitted into a band.
///
/// Levels, where present, are expected in ascending order:
///   alert < minor < major
/// That ordering is an upstream data-quality assumption and is not
/// repaired here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub alert_m: Option<f64>,
    pub minor_m: Option<f64>,
    pub major_m: Option<f64>,
}

/// The latest upstream gauge observation for one station.
///
/// Fetched fresh on every aggregation cycle and superseded entirely by the
/// next fetch; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    /// Station join key ("gauge" attribute on the live feed).
    pub station: String,
    pub water_level_m: Option<f64>,
    pub thresholds: ThresholdSet,
    pub observed: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// A canonical monitoring point with its classified status.
///
/// Constructed fresh each time the station list is requested; `status` is
/// always recomputed from the latest reading, never carried over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// Unique name, used to join readings, geometry, and basin state.
    pub name: String,
    /// Owning river basin. May be empty when upstream omits it.
    pub basin: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub status: FloodStatus,
    pub water_level_m: Option<f64>,
    /// Absent when no reading exists for the station at all.
    pub thresholds: Option<ThresholdSet>,
    pub updated: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Derived aggregates
// ---------------------------------------------------------------------------

/// Compact station entry used in flooding lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodingStation {
    pub name: String,
    pub basin: String,
    pub status: FloodStatus,
    pub water_level_m: Option<f64>,
}

/// Network-wide snapshot: counts per status plus the ordered flooding list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodSummary {
    pub total_stations: usize,
    pub major_flood: usize,
    pub minor_flood: usize,
    pub alert: usize,
    pub normal: usize,
    pub unknown: usize,
    pub no_data: usize,
    /// MAJOR_FLOOD entries first, then MINOR_FLOOD, each group descending
    /// by water level.
    pub flooding_stations: Vec<FloodingStation>,
    /// Distinct non-empty basin names, in order of first appearance in
    /// `flooding_stations`.
    pub affected_basins: Vec<String>,
}

/// Per-basin aggregate, recomputed from the station list on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct BasinState {
    pub basin: String,
    /// Worst status among member stations.
    pub status: FloodStatus,
    /// Member stations currently in MAJOR_FLOOD or MINOR_FLOOD.
    pub flooding: Vec<FloodingStation>,
}

impl BasinState {
    /// A basin qualifies as flooded iff its worst status is an active
    /// flood level.
    pub fn is_flooded(&self) -> bool {
        self.status.is_flooding()
    }
}

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

/// A station within the risk search radius, annotated with its distance
/// from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    #[serde(flatten)]
    pub station: Station,
    /// Kilometers from the query point, rounded to one decimal place.
    pub distance_km: f64,
}

/// Risk verdict for an arbitrary query point. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub risk_level: RiskLevel,
    pub summary: String,
    /// Closest stations within the radius, capped at five entries.
    pub nearby: Vec<NearbyStation>,
    pub advice: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing feature-service data.
#[derive(Debug, PartialEq)]
pub enum FeedError {
    /// Non-2xx HTTP response from the feature service.
    Http(u16),
    /// The request could not be sent or completed (DNS, timeout, TLS, …),
    /// or the service reported an error payload.
    Request(String),
    /// The response body could not be deserialized.
    Parse(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Http(code) => write!(f, "HTTP error: {}", code),
            FeedError::Request(msg) => write!(f, "Request failed: {}", msg),
            FeedError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
