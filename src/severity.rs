//! Flood severity classification.
//!
//! Maps a water level against a station's three threshold levels and maps a
//! worst-of-group status onto a location risk level. Both functions are pure
//! and total — every input combination yields exactly one enum value.

use crate::model::{FloodStatus, RiskLevel, ThresholdSet};

/// Classifies a water level against the alert / minor / major thresholds.
///
/// Strict about missing inputs: if *any* of the four values is absent the
/// result is `Unknown` — a station with a reading but a partial threshold
/// set cannot be placed in a band and must not default to `Normal`.
///
/// Bands (thresholds assumed ascending, an upstream data-quality contract):
///   level < alert          → NORMAL
///   alert <= level < minor → ALERT
///   minor <= level < major → MINOR_FLOOD
///   level >= major         → MAJOR_FLOOD
///
/// `NoData` is never returned here; the aggregator assigns it when no
/// reading exists for a station at all.
pub fn classify(
    level: Option<f64>,
    alert: Option<f64>,
    minor: Option<f64>,
    major: Option<f64>,
) -> FloodStatus {
    let (level, alert, minor, major) = match (level, alert, minor, major) {
        (Some(l), Some(a), Some(mi), Some(ma)) => (l, a, mi, ma),
        _ => return FloodStatus::Unknown,
    };

    if level < alert {
        FloodStatus::Normal
    } else if level < minor {
        FloodStatus::Alert
    } else if level < major {
        FloodStatus::MinorFlood
    } else {
        FloodStatus::MajorFlood
    }
}

/// Convenience wrapper classifying a level against a `ThresholdSet`.
pub fn classify_with(level: Option<f64>, thresholds: &ThresholdSet) -> FloodStatus {
    classify(
        level,
        thresholds.alert_m,
        thresholds.minor_m,
        thresholds.major_m,
    )
}

/// Maps the worst status found near a query point to a risk verdict.
///
/// Both flood levels map to HIGH; anything that is not an actual
/// measurement outcome (UNKNOWN, NO_DATA) yields an UNKNOWN verdict rather
/// than a falsely reassuring LOW.
pub fn risk_level(worst: FloodStatus) -> RiskLevel {
    match worst {
        FloodStatus::MajorFlood | FloodStatus::MinorFlood => RiskLevel::High,
        FloodStatus::Alert => RiskLevel::Medium,
        FloodStatus::Normal => RiskLevel::Low,
        FloodStatus::Unknown | FloodStatus::NoData => RiskLevel::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
