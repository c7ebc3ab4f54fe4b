//! Sri Lanka Flood Monitoring Service - CLI entry point
//!
//! Aggregates live water levels from the Irrigation Department feature
//! feeds, classifies every gauging station against its flood thresholds,
//! and reports basin and location risk.
//!
//! Usage:
//!   cargo run --release                     # Live status dashboard
//!   cargo run --release -- 6.85 80.03       # Risk assessment for a point
//!   cargo run --release -- --rivers         # Flooded rivers (simplified) as JSON
//!   cargo run --release -- --endpoint 8080  # Serve the HTTP endpoint
//!
//! Environment:
//!   FEED_BASE_URL - Override the feature-service base URL (also via .env)

use std::env;

use lkflood_service::basins;
use lkflood_service::endpoint;
use lkflood_service::ingest::arcgis::FeedClient;
use lkflood_service::model::{FloodStatus, Station};
use lkflood_service::reference::ReferenceData;
use lkflood_service::{aggregate, risk, rivers, summary};

fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let feed = FeedClient::from_env();

    match args.len() {
        1 => run_dashboard(&feed),
        2 if args[1] == "--rivers" => run_rivers(&feed, true),
        2 => usage_and_exit(&args[0]),
        3 if args[1] == "--endpoint" => {
            let port: u16 = args[2].parse().unwrap_or_else(|_| {
                eprintln!("Error: --endpoint requires a port number");
                std::process::exit(1);
            });
            run_endpoint(&feed, port);
        }
        3 if args[1] == "--rivers" && args[2] == "--detailed" => run_rivers(&feed, false),
        3 => run_risk(&feed, &args[1], &args[2]),
        _ => usage_and_exit(&args[0]),
    }
}

fn usage_and_exit(program: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {}                      - show current flood status", program);
    eprintln!("  {} <lat> <lon>          - check risk for a location", program);
    eprintln!("  {} --rivers [--detailed] - flooded river geometry as JSON", program);
    eprintln!("  {} --endpoint PORT      - serve the HTTP endpoint", program);
    std::process::exit(1)
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn run_dashboard(feed: &FeedClient) {
    println!("🌊 Sri Lanka Flood Monitoring Service");
    println!("======================================\n");
    println!("Fetching live data from the Irrigation Department feeds...\n");

    let stations = match aggregate::collect_stations(feed) {
        Ok(stations) => stations,
        Err(e) => {
            eprintln!("❌ Data unavailable: {}\n", e);
            eprintln!("The station feed could not be aggregated; no flood status");
            eprintln!("can be reported. This is not the same as \"no flooding\".");
            std::process::exit(1);
        }
    };

    let summary = summary::build_summary(&stations);

    println!("SUMMARY: {} stations monitored", summary.total_stations);
    println!();
    println!("   🔴 Major flood: {:>3}", summary.major_flood);
    println!("   🟠 Minor flood: {:>3}", summary.minor_flood);
    println!("   🟡 Alert:       {:>3}", summary.alert);
    println!("   🟢 Normal:      {:>3}", summary.normal);
    println!("   ❓ Unknown:     {:>3}", summary.unknown);
    println!("   ⚪ No data:     {:>3}", summary.no_data);
    println!();

    if !summary.flooding_stations.is_empty() {
        println!("⚠️  ACTIVE FLOODING");
        println!("--------------------------------------");
        for station in &summary.flooding_stations {
            let icon = status_icon(station.status);
            let level = station
                .water_level_m
                .map(|l| format!("{:.2} m", l))
                .unwrap_or_else(|| "?".to_string());
            println!("   {} {} ({}): {}", icon, station.name, station.basin, level);
        }
        println!();
        println!("Affected basins: {}", summary.affected_basins.join(", "));
        println!();
    }

    print_basin_breakdown(&stations);
}

fn print_basin_breakdown(stations: &[Station]) {
    println!("STATUS BY RIVER BASIN");
    println!("--------------------------------------");

    let mut states = basins::basin_states(stations);
    states.sort_by_key(|s| s.status);

    for state in states {
        println!();
        println!("   {} {}", status_icon(state.status), state.basin);

        let mut members: Vec<&Station> =
            stations.iter().filter(|s| s.basin == state.basin).collect();
        members.sort_by_key(|s| s.status);

        for station in members {
            let level = station
                .water_level_m
                .map(|l| format!("{:.2} m", l))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "      {:<20} {:<12} {}",
                station.name,
                station.status.as_str(),
                level
            );
        }
    }

    println!();
    println!("Data source: Sri Lanka Irrigation Department (via ArcGIS)");
    println!("⚠️  Unofficial - follow official government alerts.");
}

fn run_risk(feed: &FeedClient, lat_arg: &str, lon_arg: &str) {
    // Validate caller input before touching the network.
    let (Ok(lat), Ok(lon)) = (lat_arg.parse::<f64>(), lon_arg.parse::<f64>()) else {
        eprintln!("Error: lat/lon must be numeric, got '{}' '{}'", lat_arg, lon_arg);
        std::process::exit(1);
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        eprintln!("Error: coordinates out of range: {} {}", lat, lon);
        std::process::exit(1);
    }

    match risk::check_risk(feed, lat, lon, risk::DEFAULT_RADIUS_KM) {
        Ok(assessment) => match serde_json::to_string_pretty(&assessment) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize assessment: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("❌ Risk check failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_rivers(feed: &FeedClient, simplified: bool) {
    let reference = load_reference();
    match rivers::flooded_rivers(feed, &reference, simplified) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize river geometry: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("❌ River join failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_endpoint(feed: &FeedClient, port: u16) {
    let reference = load_reference();
    println!("🚀 Starting HTTP endpoint server...");
    if let Err(e) = endpoint::start_endpoint_server(port, feed.clone(), reference) {
        eprintln!("❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}

fn load_reference() -> ReferenceData {
    ReferenceData::load_default().unwrap_or_else(|e| {
        eprintln!("❌ Failed to load reference tables: {}", e);
        eprintln!("   Expected locations.toml, stations.toml, river_lines.toml in the working directory");
        std::process::exit(1);
    })
}

fn status_icon(status: FloodStatus) -> &'static str {
    match status {
        FloodStatus::MajorFlood => "🔴",
        FloodStatus::MinorFlood => "🟠",
        FloodStatus::Alert => "🟡",
        FloodStatus::Normal => "🟢",
        FloodStatus::Unknown => "❓",
        FloodStatus::NoData => "⚪",
    }
}
