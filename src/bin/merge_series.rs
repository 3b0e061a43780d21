#!/usr/bin/env rust
//! Offline Series Merge
//!
//! Merges a water-level sensor CSV with an hourly weather CSV into the
//! merged table the service trains on. The merge is a left join on the
//! sensor series: every sensor row is kept, and weather columns are
//! filled where an observation shares the same calendar hour.
//!
//! Usage:
//!   cargo run --bin merge_series -- SENSOR_CSV WEATHER_CSV OUTPUT_CSV

use floodrisk_service::align::{matched_count, merge_hourly};
use floodrisk_service::ingest::readings::{merged_to_csv, parse_sensor_csv, parse_weather_csv};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔗 Offline Series Merge");
    println!("=======================\n");

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} SENSOR_CSV WEATHER_CSV OUTPUT_CSV", args[0]);
        std::process::exit(1);
    }

    println!("📊 Reading sensor series from {}...", args[1]);
    let sensor_text = std::fs::read_to_string(&args[1])?;
    let sensors = parse_sensor_csv(&sensor_text)?;
    println!("✓ {} sensor readings\n", sensors.len());

    println!("📊 Reading weather series from {}...", args[2]);
    let weather_text = std::fs::read_to_string(&args[2])?;
    let weather = parse_weather_csv(&weather_text)?;
    println!("✓ {} weather observations\n", weather.len());

    let merged = merge_hourly(&sensors, &weather);
    let matched = matched_count(&merged);
    println!(
        "🔗 Merged {} rows: {} with weather, {} without",
        merged.len(),
        matched,
        merged.len() - matched
    );

    std::fs::write(&args[3], merged_to_csv(&merged))?;
    println!("✓ Wrote {}", args[3]);

    Ok(())
}
